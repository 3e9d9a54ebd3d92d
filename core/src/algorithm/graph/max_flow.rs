//! FIFO Push-Relabel Maximum Flow
//!
//! This module implements the generic Goldberg-Tarjan preflow-push
//! algorithm over a dense capacity matrix with FIFO active-node selection.
//! No global relabeling, gap heuristic or highest-label selection is
//! applied; the engine performs O(n^2) relabels and O(n^3) pushes in the
//! worst case.
//!
//! # Invariants
//! After every push and every relabel:
//! - `flow[u][v] <= capacity(u, v)` (capacity feasibility)
//! - `flow[u][v] == -flow[v][u]` (antisymmetry)
//! - `height[u] <= height[v] + 1` on every residual arc (valid labeling)
//!
//! Once the active queue drains, no interior node holds excess and
//! `excess[sink]` is the maximum flow value.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::VecDeque;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::algorithm::graph::augmenting_path::EdmondsKarp;
use crate::algorithm::traits::{
    CapacityGraph, DistanceLabel, Flow, FlowError, FlowMetrics, InvariantViolation, MaxFlowEngine,
    NodeId,
};
use crate::data_structures::active_queue::ActiveQueue;
use crate::validation::correctness;

/// Maximum flow algorithm variants
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MaxFlowAlgorithm {
    /// Goldberg-Tarjan push-relabel with FIFO vertex selection
    #[default]
    PushRelabelFifo,
    /// Edmonds-Karp with BFS shortest augmenting paths
    EdmondsKarp,
}

impl MaxFlowAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            MaxFlowAlgorithm::PushRelabelFifo => "Push-Relabel FIFO",
            MaxFlowAlgorithm::EdmondsKarp => "Edmonds-Karp",
        }
    }

    /// Builds a fresh engine of this variant over `graph`
    pub fn engine<'g, G>(&self, graph: &'g G, verify_invariants: bool) -> Box<dyn MaxFlowEngine + 'g>
    where
        G: CapacityGraph + ?Sized,
    {
        match self {
            MaxFlowAlgorithm::PushRelabelFifo => {
                Box::new(MaxFlowSolver::new(graph).with_invariant_checks(verify_invariants))
            }
            MaxFlowAlgorithm::EdmondsKarp => Box::new(EdmondsKarp::new(graph)),
        }
    }
}

/// Role a node plays in the current source/sink pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    Source,
    Sink,
    Interior,
}

/// The source/sink pair of one max-flow computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Terminals {
    pub source: NodeId,
    pub sink: NodeId,
}

impl Terminals {
    pub fn new(source: NodeId, sink: NodeId) -> Self {
        Self { source, sink }
    }

    #[inline]
    pub fn role(&self, node: NodeId) -> NodeRole {
        if node == self.source {
            NodeRole::Source
        } else if node == self.sink {
            NodeRole::Sink
        } else {
            NodeRole::Interior
        }
    }

    #[inline]
    pub fn is_source(&self, node: NodeId) -> bool {
        node == self.source
    }

    #[inline]
    pub fn is_sink(&self, node: NodeId) -> bool {
        node == self.sink
    }

    /// A node may be (re)activated if and only if it is neither terminal
    #[inline]
    pub fn is_interior(&self, node: NodeId) -> bool {
        self.role(node) == NodeRole::Interior
    }
}

/// Mutable preflow state for one (source, sink) computation
///
/// Owned by a single solver; `reset` clears every buffer so the same
/// allocation can serve the next pair.
#[derive(Debug, Clone, Default)]
pub struct FlowState {
    /// Number of nodes
    node_count: usize,
    /// Row-major flow matrix, `flow[u * n + v]` is the flow on `u -> v`
    flow: Vec<Flow>,
    /// Excess at each node; not tracked for the source
    excess: Vec<Flow>,
    /// Distance labels
    height: Vec<DistanceLabel>,
    /// Nodes awaiting discharge
    queue: ActiveQueue,
}

impl FlowState {
    /// Create zeroed state for `node_count` nodes
    pub fn new(node_count: usize) -> Self {
        let mut state = Self::default();
        state.reset(node_count);
        state
    }

    /// Zero every buffer and resize it for `node_count` nodes
    pub fn reset(&mut self, node_count: usize) {
        self.node_count = node_count;
        self.flow.clear();
        self.flow.resize(node_count * node_count, 0);
        self.excess.clear();
        self.excess.resize(node_count, 0);
        self.height.clear();
        self.height.resize(node_count, 0);
        self.queue.clear();
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Flow currently carried by arc `from -> to`
    #[inline]
    pub fn flow(&self, from: NodeId, to: NodeId) -> Flow {
        self.flow[from * self.node_count + to]
    }

    #[inline]
    pub fn excess(&self, node: NodeId) -> Flow {
        self.excess[node]
    }

    #[inline]
    pub fn height(&self, node: NodeId) -> DistanceLabel {
        self.height[node]
    }

    pub fn queue(&self) -> &ActiveQueue {
        &self.queue
    }

    /// Move `amount` along `from -> to`, keeping antisymmetry
    #[inline]
    fn add_flow(&mut self, from: NodeId, to: NodeId, amount: Flow) {
        let n = self.node_count;
        self.flow[from * n + to] += amount;
        self.flow[to * n + from] -= amount;
    }

    #[cfg(test)]
    pub(crate) fn set_flow(&mut self, from: NodeId, to: NodeId, flow: Flow) {
        self.flow[from * self.node_count + to] = flow;
    }

    #[cfg(test)]
    pub(crate) fn set_excess(&mut self, node: NodeId, excess: Flow) {
        self.excess[node] = excess;
    }

    #[cfg(test)]
    pub(crate) fn set_height(&mut self, node: NodeId, height: DistanceLabel) {
        self.height[node] = height;
    }
}

/// FIFO push-relabel solver bound to one capacity graph
#[derive(Debug, Clone)]
pub struct MaxFlowSolver<G> {
    /// Shared read-only capacities
    graph: G,
    /// Private preflow buffers, reused across pairs
    state: FlowState,
    /// Pair of the most recent computation
    terminals: Option<Terminals>,
    /// Counters for the most recent computation
    metrics: FlowMetrics,
    /// Check all invariants after every push and relabel
    verify_invariants: bool,
}

impl<G: CapacityGraph> MaxFlowSolver<G> {
    /// Create new solver over `graph`
    pub fn new(graph: G) -> Self {
        let state = FlowState::new(graph.node_count());
        Self {
            graph,
            state,
            terminals: None,
            metrics: FlowMetrics::default(),
            verify_invariants: false,
        }
    }

    /// Enable or disable invariant verification after every operation
    pub fn with_invariant_checks(mut self, enabled: bool) -> Self {
        self.verify_invariants = enabled;
        self
    }

    pub fn graph(&self) -> &G {
        &self.graph
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn terminals(&self) -> Option<Terminals> {
        self.terminals
    }

    /// Computes the maximum flow from `source` to `sink`
    pub fn solve(&mut self, source: NodeId, sink: NodeId) -> Result<Flow, FlowError> {
        self.graph.check_pair(source, sink)?;
        let terminals = Terminals::new(source, sink);

        self.initialize(terminals);
        self.discharge_all(terminals)?;

        if self.verify_invariants {
            correctness::check_terminated(&self.graph, &self.state, terminals)?;
        }

        let value = self.state.excess(sink);
        debug!(
            "max flow {} -> {} = {} ({} pushes, {} relabels)",
            source, sink, value, self.metrics.push_operations, self.metrics.relabel_operations
        );
        Ok(value)
    }

    /// Resets all state and saturates every arc leaving the source
    fn initialize(&mut self, terminals: Terminals) {
        let n = self.graph.node_count();
        let source = terminals.source;

        self.state.reset(n);
        self.metrics = FlowMetrics::default();
        self.terminals = Some(terminals);
        self.state.height[source] = n;

        for v in 0..n {
            if v == source {
                continue;
            }
            let capacity = self.graph.capacity(source, v);
            if capacity > 0 {
                self.state.add_flow(source, v, capacity);
                self.state.excess[v] = capacity;
                if terminals.is_interior(v) {
                    self.state.queue.push(v);
                }
            }
        }
    }

    /// Drains the active queue to a fixed point
    fn discharge_all(&mut self, terminals: Terminals) -> Result<(), FlowError> {
        while !self.state.queue.is_empty() {
            let node = self.state.queue.pop()?;
            while self.state.excess[node] > 0 {
                if !self.push(node, terminals) {
                    self.relabel(node)?;
                }
                if self.verify_invariants {
                    correctness::check_preflow(&self.graph, &self.state, terminals)?;
                }
            }
        }
        Ok(())
    }

    /// Pushes excess along the first admissible arc out of `node`
    ///
    /// Returns false when no admissible arc exists; the caller must relabel.
    fn push(&mut self, node: NodeId, terminals: Terminals) -> bool {
        let n = self.graph.node_count();
        let height = self.state.height[node];

        for v in 0..n {
            if v == node || height != self.state.height[v] + 1 {
                continue;
            }
            let residual = self.graph.capacity(node, v) - self.state.flow(node, v);
            if residual <= 0 {
                continue;
            }

            let amount = residual.min(self.state.excess[node]);
            self.state.excess[node] -= amount;
            match terminals.role(v) {
                NodeRole::Source => {}
                NodeRole::Sink => self.state.excess[v] += amount,
                NodeRole::Interior => {
                    let was_idle = self.state.excess[v] == 0;
                    self.state.excess[v] += amount;
                    if was_idle {
                        self.state.queue.push(v);
                    }
                }
            }
            self.state.add_flow(node, v, amount);
            self.metrics.push_operations += 1;
            trace!("push {} units {} -> {}", amount, node, v);
            return true;
        }

        false
    }

    /// Lifts `node` one above its lowest residual neighbour and re-enqueues it
    fn relabel(&mut self, node: NodeId) -> Result<(), FlowError> {
        let n = self.graph.node_count();

        let lowest = (0..n)
            .filter(|&v| v != node && self.graph.capacity(node, v) - self.state.flow(node, v) > 0)
            .map(|v| self.state.height[v])
            .min()
            .ok_or(InvariantViolation::RelabelNoResidualArc {
                node,
                excess: self.state.excess[node],
            })?;

        self.state.height[node] = lowest + 1;
        self.state.queue.push(node);
        self.metrics.relabel_operations += 1;
        trace!("relabel {} to height {}", node, lowest + 1);
        Ok(())
    }

    /// Source side of a minimum cut for the most recent pair
    ///
    /// These are the nodes reachable from the source over residual arcs,
    /// in ascending order. `None` before the first solve.
    pub fn source_side_cut(&self) -> Option<Vec<NodeId>> {
        let terminals = self.terminals?;
        let n = self.graph.node_count();
        let mut reached = vec![false; n];
        let mut frontier = VecDeque::from([terminals.source]);
        reached[terminals.source] = true;

        while let Some(u) = frontier.pop_front() {
            for v in 0..n {
                if !reached[v] && self.graph.capacity(u, v) - self.state.flow(u, v) > 0 {
                    reached[v] = true;
                    frontier.push_back(v);
                }
            }
        }

        Some((0..n).filter(|&v| reached[v]).collect())
    }
}

impl<G: CapacityGraph + Send> MaxFlowEngine for MaxFlowSolver<G> {
    fn name(&self) -> &'static str {
        MaxFlowAlgorithm::PushRelabelFifo.name()
    }

    fn solve(&mut self, source: NodeId, sink: NodeId) -> Result<Flow, FlowError> {
        MaxFlowSolver::solve(self, source, sink)
    }

    fn metrics(&self) -> FlowMetrics {
        self.metrics
    }
}

/// Computes the maximum flow value from `source` to `sink` on `graph`
pub fn compute_max_flow<G>(graph: &G, source: NodeId, sink: NodeId) -> Result<Flow, FlowError>
where
    G: CapacityGraph + ?Sized,
{
    MaxFlowSolver::new(graph).solve(source, sink)
}


/// Property-based testing
#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::data_structures::graph::CapacityMatrix;
    use quickcheck::{quickcheck, TestResult};

    /// Builds a graph on `n` nodes from raw bytes, roughly a third of arcs present
    fn graph_from_bytes(n: usize, bytes: &[u8]) -> CapacityMatrix {
        let capacities = (0..n * n)
            .map(|i| {
                let byte = bytes.get(i).copied().unwrap_or(0);
                if byte % 3 == 0 {
                    Flow::from(byte % 17)
                } else {
                    0
                }
            })
            .collect();
        CapacityMatrix::from_row_major(n, capacities).unwrap()
    }

    quickcheck! {
        fn prop_matches_augmenting_paths(size: u8, bytes: Vec<u8>, s: u8, t: u8) -> TestResult {
            let n = 2 + (size % 7) as usize;
            let (s, t) = (s as usize % n, t as usize % n);
            if s == t {
                return TestResult::discard();
            }
            let graph = graph_from_bytes(n, &bytes);

            let mut reference = EdmondsKarp::new(&graph);
            let mut solver = MaxFlowSolver::new(&graph).with_invariant_checks(true);
            TestResult::from_bool(solver.solve(s, t) == reference.solve(s, t))
        }

        fn prop_conservation_at_termination(size: u8, bytes: Vec<u8>) -> TestResult {
            let n = 2 + (size % 7) as usize;
            let graph = graph_from_bytes(n, &bytes);
            let mut solver = MaxFlowSolver::new(&graph);
            if solver.solve(0, n - 1).is_err() {
                return TestResult::failed();
            }
            let state = solver.state();
            TestResult::from_bool(
                (1..n - 1).all(|v| state.excess(v) == 0) &&
                (0..n).all(|u| (0..n).all(|v| {
                    state.flow(u, v) == -state.flow(v, u) &&
                    state.flow(u, v) <= graph.capacity(u, v)
                }))
            )
        }
    }
}
