//! Maximum flow engines and the all-pairs driver
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod all_pairs;
pub mod augmenting_path;
pub mod max_flow;

pub use self::all_pairs::{AllPairsDriver, AllPairsReport, DriverConfig, ExecutionMode};
pub use self::augmenting_path::EdmondsKarp;
pub use self::max_flow::{FlowState, MaxFlowAlgorithm, MaxFlowSolver, NodeRole, Terminals};
