//! Edmonds-Karp maximum flow over a dense capacity matrix
//!
//! Repeated breadth-first search for shortest augmenting paths in the
//! residual graph. Slower than push-relabel on dense inputs but simple
//! enough to serve as an independent cross-check of its results.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::VecDeque;

use log::debug;

use crate::algorithm::traits::{CapacityGraph, Flow, FlowError, FlowMetrics, MaxFlowEngine, NodeId};

/// Breadth-first augmenting path solver
#[derive(Debug, Clone)]
pub struct EdmondsKarp<G> {
    graph: G,
    /// Row-major residual capacities
    residual: Vec<Flow>,
    /// BFS predecessor of each node on the current path
    parent: Vec<Option<NodeId>>,
    metrics: FlowMetrics,
}

impl<G: CapacityGraph> EdmondsKarp<G> {
    pub fn new(graph: G) -> Self {
        let n = graph.node_count();
        Self {
            graph,
            residual: vec![0; n * n],
            parent: vec![None; n],
            metrics: FlowMetrics::default(),
        }
    }

    pub fn solve(&mut self, source: NodeId, sink: NodeId) -> Result<Flow, FlowError> {
        self.graph.check_pair(source, sink)?;
        let n = self.graph.node_count();

        self.metrics = FlowMetrics::default();
        for u in 0..n {
            for v in 0..n {
                self.residual[u * n + v] = if u == v { 0 } else { self.graph.capacity(u, v) };
            }
        }

        let mut total = 0;
        while let Some(bottleneck) = self.find_path(source, sink) {
            let mut v = sink;
            while let Some(u) = self.parent[v] {
                self.residual[u * n + v] -= bottleneck;
                self.residual[v * n + u] += bottleneck;
                v = u;
            }
            total += bottleneck;
            self.metrics.push_operations += 1;
        }

        debug!(
            "edmonds-karp {} -> {} = {} ({} augmentations)",
            source, sink, total, self.metrics.push_operations
        );
        Ok(total)
    }

    /// BFS from `source`; records parents and returns the path bottleneck
    fn find_path(&mut self, source: NodeId, sink: NodeId) -> Option<Flow> {
        let n = self.graph.node_count();
        self.parent.iter_mut().for_each(|p| *p = None);

        let mut visited = vec![false; n];
        let mut queue = VecDeque::from([source]);
        visited[source] = true;

        while let Some(u) = queue.pop_front() {
            for v in 0..n {
                if !visited[v] && self.residual[u * n + v] > 0 {
                    visited[v] = true;
                    self.parent[v] = Some(u);
                    if v == sink {
                        return Some(self.bottleneck(sink));
                    }
                    queue.push_back(v);
                }
            }
        }
        None
    }

    fn bottleneck(&self, sink: NodeId) -> Flow {
        let n = self.graph.node_count();
        let mut amount = Flow::MAX;
        let mut v = sink;
        while let Some(u) = self.parent[v] {
            amount = amount.min(self.residual[u * n + v]);
            v = u;
        }
        amount
    }
}

impl<G: CapacityGraph + Send> MaxFlowEngine for EdmondsKarp<G> {
    fn name(&self) -> &'static str {
        "Edmonds-Karp"
    }

    fn solve(&mut self, source: NodeId, sink: NodeId) -> Result<Flow, FlowError> {
        EdmondsKarp::solve(self, source, sink)
    }

    fn metrics(&self) -> FlowMetrics {
        self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::graph::CapacityMatrix;

    #[test]
    fn test_reference_on_small_graphs() {
        let path = CapacityMatrix::from_arcs(4, vec![(0, 1, 10), (1, 2, 5), (2, 3, 10)]).unwrap();
        let mut solver = EdmondsKarp::new(&path);
        assert_eq!(solver.solve(0, 3), Ok(5));
        assert_eq!(solver.solve(3, 0), Ok(0));

        let diamond =
            CapacityMatrix::from_arcs(4, vec![(0, 1, 3), (0, 2, 2), (1, 3, 2), (2, 3, 3), (1, 2, 1)])
                .unwrap();
        let mut solver = EdmondsKarp::new(&diamond);
        assert_eq!(solver.solve(0, 3), Ok(5));
        assert_eq!(solver.metrics().push_operations, 3);
    }

    #[test]
    fn test_rejects_invalid_pair() {
        let graph = CapacityMatrix::from_arcs(2, vec![(0, 1, 1)]).unwrap();
        let mut solver = EdmondsKarp::new(&graph);
        assert_eq!(solver.solve(0, 0), Err(FlowError::SourceIsSink(0)));
    }
}
