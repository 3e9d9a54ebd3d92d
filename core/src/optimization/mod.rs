//! Parallel scheduling support
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod parallel;

pub use self::parallel::{ChunkPlan, PairIndexSpace};
