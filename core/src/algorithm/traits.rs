//! Core trait definitions for the WEAKCUT flow engines
//!
//! This module fixes the vocabulary shared by every engine in the crate:
//! node, capacity and flow types, the read-only capacity lookup that all
//! engines consume, the per-pair solver interface the all-pairs driver
//! dispatches through, and the error taxonomy.
//!
//! # Key Design Principles
//! - Capacity lookup is immutable and `Sync`, so any number of workers may
//!   read one graph without locking
//! - Solver state is owned by exactly one solver instance
//! - Precondition failures and invariant breaches are distinct error kinds
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use serde::{Deserialize, Serialize};

/// Node identifier, an index in `[0, n)`
pub type NodeId = usize;

/// Arc capacity type; stored values are never negative
pub type Capacity = i64;

/// Flow value type; negative on the reverse side of an arc
pub type Flow = i64;

/// Distance label type for push-relabel
pub type DistanceLabel = usize;

/// Read-only dense capacity lookup over `n` nodes
///
/// # Invariants
/// - `capacity(u, v) >= 0` for every `u, v` in `[0, n)`
/// - `capacity(u, u) == 0`; self-loops carry no flow
/// - For every node, its outgoing plus incoming capacities sum without
///   overflowing [`Capacity`]; every flow and excess value is bounded by
///   these sums
/// - The answer for a given pair never changes during a computation
pub trait CapacityGraph: Sync {
    /// Number of nodes `n`
    fn node_count(&self) -> usize;

    /// Capacity of arc `from -> to`, `0` when there is no arc
    fn capacity(&self, from: NodeId, to: NodeId) -> Capacity;

    /// Validates that `node` lies in `[0, n)`
    fn check_node(&self, node: NodeId) -> Result<(), FlowError> {
        let node_count = self.node_count();
        if node < node_count {
            Ok(())
        } else {
            Err(FlowError::NodeOutOfRange { node, node_count })
        }
    }

    /// Validates a single-pair request before any engine work begins
    fn check_pair(&self, source: NodeId, sink: NodeId) -> Result<(), FlowError> {
        if self.node_count() == 0 {
            return Err(FlowError::EmptyGraph);
        }
        self.check_node(source)?;
        self.check_node(sink)?;
        if source == sink {
            return Err(FlowError::SourceIsSink(source));
        }
        Ok(())
    }
}

impl<G: CapacityGraph + ?Sized> CapacityGraph for &G {
    fn node_count(&self) -> usize {
        (**self).node_count()
    }

    fn capacity(&self, from: NodeId, to: NodeId) -> Capacity {
        (**self).capacity(from, to)
    }
}

/// Per-solve operation counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowMetrics {
    /// Number of successful push operations (or augmentations)
    pub push_operations: u64,
    /// Number of relabel operations
    pub relabel_operations: u64,
}

impl FlowMetrics {
    /// Adds another run's counters into this one
    pub fn absorb(&mut self, other: &FlowMetrics) {
        self.push_operations += other.push_operations;
        self.relabel_operations += other.relabel_operations;
    }
}

/// Maximum flow engine bound to one capacity graph
///
/// An engine owns all of its mutable buffers; one instance must never be
/// driven from two tasks at once. Reusing an instance across pairs is
/// allowed, every `solve` starts from a fully reset state.
pub trait MaxFlowEngine: Send {
    /// Returns the engine's descriptive name
    fn name(&self) -> &'static str;

    /// Computes the maximum flow value from `source` to `sink`
    fn solve(&mut self, source: NodeId, sink: NodeId) -> Result<Flow, FlowError>;

    /// Counters accumulated by the most recent `solve`
    fn metrics(&self) -> FlowMetrics;
}

/// Correctness invariant breaches detected while computing a flow
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("relabel of node {node} found no residual arc while holding excess {excess}")]
    RelabelNoResidualArc { node: NodeId, excess: Flow },

    #[error("flow {flow} on arc {from}->{to} exceeds capacity {capacity}")]
    CapacityExceeded {
        from: NodeId,
        to: NodeId,
        flow: Flow,
        capacity: Capacity,
    },

    #[error("flow on {from}->{to} is {forward} but reverse flow is {reverse}")]
    Antisymmetry {
        from: NodeId,
        to: NodeId,
        forward: Flow,
        reverse: Flow,
    },

    #[error("residual arc {from}->{to} has heights {from_height} > {to_height} + 1")]
    HeightAdmissibility {
        from: NodeId,
        to: NodeId,
        from_height: DistanceLabel,
        to_height: DistanceLabel,
    },

    #[error("node {node} has excess {recorded} but net inflow {net_inflow}")]
    ExcessMismatch {
        node: NodeId,
        recorded: Flow,
        net_inflow: Flow,
    },

    #[error("node {node} holds excess {excess} after termination")]
    ResidualExcess { node: NodeId, excess: Flow },

    #[error("source height changed to {height}, expected {expected}")]
    SourceHeight {
        height: DistanceLabel,
        expected: DistanceLabel,
    },
}

/// Comprehensive error types for flow computations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    #[error("graph has no nodes")]
    EmptyGraph,

    #[error("node {node} out of range for graph with {node_count} nodes")]
    NodeOutOfRange { node: NodeId, node_count: usize },

    #[error("source and sink are both node {0}")]
    SourceIsSink(NodeId),

    #[error("negative capacity {capacity} on arc {from}->{to}")]
    NegativeCapacity {
        from: NodeId,
        to: NodeId,
        capacity: Capacity,
    },

    #[error("capacities incident to node {node} sum past the capacity range")]
    CapacityOverflow { node: NodeId },

    #[error("capacity table has {found} entries, expected {expected}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("permutation maps more than one node to {0} or leaves [0, n)")]
    InvalidPermutation(NodeId),

    #[error("worker count must be positive, got {0}")]
    InvalidWorkerCount(usize),

    #[error("graph with {node_count} node(s) has no ordered pair of distinct nodes")]
    NoPairs { node_count: usize },

    #[error("pop from empty active-node queue")]
    EmptyQueue,

    #[error("invariant violation: {0}")]
    InvariantViolation(#[from] InvariantViolation),

    #[error("worker pool construction failed: {0}")]
    ThreadPool(String),
}

impl FlowError {
    /// Returns true for the precondition failures rejected at the public boundary
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            FlowError::EmptyGraph
                | FlowError::NodeOutOfRange { .. }
                | FlowError::SourceIsSink(_)
                | FlowError::NegativeCapacity { .. }
                | FlowError::CapacityOverflow { .. }
                | FlowError::DimensionMismatch { .. }
                | FlowError::InvalidPermutation(_)
                | FlowError::InvalidWorkerCount(_)
                | FlowError::NoPairs { .. }
        )
    }
}
