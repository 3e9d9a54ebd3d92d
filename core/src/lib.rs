//! WEAKCUT Core
//!
//! All-pairs maximum flow over dense capacitated digraphs. A FIFO
//! push-relabel engine solves each ordered `(source, sink)` pair and the
//! all-pairs driver reduces the pairwise values to their global minimum,
//! either sequentially or across a fixed pool of workers.
//!
//! ```
//! use weakcut_core::{compute_all_pairs_minimum, compute_max_flow, CapacityMatrix};
//!
//! let graph = CapacityMatrix::from_arcs(4, vec![(0, 1, 10), (1, 2, 5), (2, 3, 10)]).unwrap();
//! assert_eq!(compute_max_flow(&graph, 0, 3), Ok(5));
//!
//! let report = compute_all_pairs_minimum(&graph, true, 2).unwrap();
//! assert_eq!(report.minimum, 0);
//! ```
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod algorithm;
pub mod data_structures;
pub mod optimization;
pub mod validation;

pub use crate::algorithm::graph::all_pairs::{
    compute_all_pairs_minimum, AllPairsDriver, AllPairsReport, DriverConfig, ExecutionMode, PairFlow,
};
pub use crate::algorithm::graph::max_flow::{compute_max_flow, FlowState, MaxFlowAlgorithm, MaxFlowSolver};
pub use crate::algorithm::traits::{
    Capacity, CapacityGraph, Flow, FlowError, FlowMetrics, InvariantViolation, MaxFlowEngine, NodeId,
};
pub use crate::data_structures::graph::CapacityMatrix;
