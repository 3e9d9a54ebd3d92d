//! Graph and worklist data structures
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod active_queue;
pub mod graph;

pub use self::active_queue::ActiveQueue;
pub use self::graph::CapacityMatrix;
