//! All-Pairs Minimum Maximum Flow
//!
//! Solves the maximum flow problem for every ordered pair of distinct
//! nodes and reduces the results to the global minimum, the weakest
//! directed cut of the network. Both execution modes walk the same pair
//! index space and fold per-pair values with the same reduction, so they
//! report identical minima for identical input.
//!
//! The parallel mode partitions the index space into chunks. Each chunk
//! runs on a worker with its own engine instance, reusing that engine's
//! buffers for every pair in the chunk. Per-chunk summaries are combined
//! lock-free at the join; the first failing pair aborts the whole run.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::ops::Range;
use std::time::{Duration, Instant};

use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::algorithm::graph::max_flow::MaxFlowAlgorithm;
use crate::algorithm::traits::{CapacityGraph, Flow, FlowError, FlowMetrics, NodeId};
use crate::optimization::parallel::{build_worker_pool, default_worker_count, ChunkPlan, PairIndexSpace};

/// How the pair grid is scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ExecutionMode {
    /// One engine, pairs in lexicographic order
    Sequential,
    /// Fixed pool of `workers` threads, one engine per chunk
    Parallel { workers: usize },
}

impl ExecutionMode {
    pub fn parallel(workers: usize) -> Self {
        ExecutionMode::Parallel { workers }
    }

    pub fn is_parallel(&self) -> bool {
        matches!(self, ExecutionMode::Parallel { .. })
    }
}

/// All-pairs driver configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Sequential or parallel scheduling
    pub mode: ExecutionMode,
    /// Per-pair engine
    pub algorithm: MaxFlowAlgorithm,
    /// Pairs per parallel task; derived from the worker count when unset
    pub chunk_size: Option<usize>,
    /// Check engine invariants after every operation
    pub verify_invariants: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::Sequential,
            algorithm: MaxFlowAlgorithm::PushRelabelFifo,
            chunk_size: None,
            verify_invariants: false,
        }
    }
}

impl DriverConfig {
    /// Parallel configuration using every available core
    pub fn parallel_default() -> Self {
        Self {
            mode: ExecutionMode::parallel(default_worker_count()),
            ..Self::default()
        }
    }
}

/// Flow value of one ordered pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairFlow {
    pub source: NodeId,
    pub sink: NodeId,
    pub value: Flow,
}

impl PairFlow {
    /// Ordering key: smallest value first, ties broken by the pair itself
    fn key(&self) -> (Flow, NodeId, NodeId) {
        (self.value, self.source, self.sink)
    }

    /// Associative, commutative minimum over optional pair flows
    pub fn min_of(a: Option<PairFlow>, b: Option<PairFlow>) -> Option<PairFlow> {
        match (a, b) {
            (Some(a), Some(b)) => Some(if b.key() < a.key() { b } else { a }),
            (a, None) => a,
            (None, b) => b,
        }
    }
}

/// Partial result of a set of pairs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ChunkSummary {
    weakest: Option<PairFlow>,
    pairs_solved: usize,
    metrics: FlowMetrics,
}

impl ChunkSummary {
    fn merge(mut self, other: ChunkSummary) -> ChunkSummary {
        self.weakest = PairFlow::min_of(self.weakest, other.weakest);
        self.pairs_solved += other.pairs_solved;
        self.metrics.absorb(&other.metrics);
        self
    }
}

/// Outcome of an all-pairs run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllPairsReport {
    /// Minimum max-flow value over all ordered pairs
    pub minimum: Flow,
    /// Lexicographically smallest pair attaining the minimum
    pub weakest_pair: (NodeId, NodeId),
    /// Number of pairs solved
    pub pairs_solved: usize,
    /// Wall-clock time of the computation
    pub elapsed: Duration,
    /// Mode the pairs were scheduled with
    pub mode: ExecutionMode,
    /// Push/relabel counters summed over every pair
    pub metrics: FlowMetrics,
}

impl AllPairsReport {
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

/// Drives one engine per pair across the whole `(s, t)` grid
#[derive(Debug, Clone, Default)]
pub struct AllPairsDriver {
    config: DriverConfig,
}

impl AllPairsDriver {
    pub fn new(config: DriverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Computes the all-pairs minimum over `graph`
    pub fn run<G>(&self, graph: &G) -> Result<AllPairsReport, FlowError>
    where
        G: CapacityGraph + ?Sized,
    {
        let node_count = graph.node_count();
        if node_count == 0 {
            return Err(FlowError::EmptyGraph);
        }
        let space = PairIndexSpace::new(node_count);
        if space.is_empty() {
            return Err(FlowError::NoPairs { node_count });
        }
        if let ExecutionMode::Parallel { workers: 0 } = self.config.mode {
            return Err(FlowError::InvalidWorkerCount(0));
        }

        info!(
            "Solving {} pairs on {} nodes with {} ({:?})",
            space.len(),
            node_count,
            self.config.algorithm.name(),
            self.config.mode
        );
        let started = Instant::now();

        let summary = match self.config.mode {
            ExecutionMode::Sequential => self.solve_chunk(graph, space, 0..space.len())?,
            ExecutionMode::Parallel { workers } => self.run_parallel(graph, space, workers)?,
        };
        let elapsed = started.elapsed();

        let weakest = summary.weakest.ok_or(FlowError::NoPairs { node_count })?;
        info!(
            "Minimum max flow {} at pair ({}, {}) after {:.6}s",
            weakest.value,
            weakest.source,
            weakest.sink,
            elapsed.as_secs_f64()
        );

        Ok(AllPairsReport {
            minimum: weakest.value,
            weakest_pair: (weakest.source, weakest.sink),
            pairs_solved: summary.pairs_solved,
            elapsed,
            mode: self.config.mode,
            metrics: summary.metrics,
        })
    }

    fn run_parallel<G>(&self, graph: &G, space: PairIndexSpace, workers: usize) -> Result<ChunkSummary, FlowError>
    where
        G: CapacityGraph + ?Sized,
    {
        let plan = ChunkPlan::new(space, workers, self.config.chunk_size);
        debug!(
            "Partitioned {} pairs into {} chunks of {} across {} workers",
            space.len(),
            plan.chunk_count(),
            plan.chunk_size(),
            workers
        );

        let pool = build_worker_pool(workers)?;
        pool.install(|| {
            plan.chunks()
                .into_par_iter()
                .map(|range| self.solve_chunk(graph, space, range))
                .try_reduce(ChunkSummary::default, |a, b| Ok(a.merge(b)))
        })
    }

    /// Solves a contiguous range of pairs with one privately owned engine
    fn solve_chunk<G>(&self, graph: &G, space: PairIndexSpace, range: Range<usize>) -> Result<ChunkSummary, FlowError>
    where
        G: CapacityGraph + ?Sized,
    {
        let mut engine = self
            .config
            .algorithm
            .engine(graph, self.config.verify_invariants);
        let mut summary = ChunkSummary::default();

        for (source, sink) in space.pairs(range) {
            let value = engine.solve(source, sink)?;
            summary.weakest = PairFlow::min_of(summary.weakest, Some(PairFlow { source, sink, value }));
            summary.pairs_solved += 1;
            summary.metrics.absorb(&engine.metrics());
        }

        Ok(summary)
    }
}

/// Computes the minimum max-flow over every ordered pair of `graph`
///
/// `worker_count` sizes the pool when `parallel` is set and is ignored
/// otherwise.
pub fn compute_all_pairs_minimum<G>(graph: &G, parallel: bool, worker_count: usize) -> Result<AllPairsReport, FlowError>
where
    G: CapacityGraph + ?Sized,
{
    let mode = if parallel {
        ExecutionMode::parallel(worker_count)
    } else {
        ExecutionMode::Sequential
    };
    AllPairsDriver::new(DriverConfig {
        mode,
        ..DriverConfig::default()
    })
    .run(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::traits::{Capacity, InvariantViolation};
    use crate::data_structures::graph::CapacityMatrix;

    fn complete_graph(n: usize, capacity: Capacity) -> CapacityMatrix {
        let arcs = (0..n).flat_map(|u| (0..n).filter(move |&v| v != u).map(move |v| (u, v, capacity)));
        CapacityMatrix::from_arcs(n, arcs).unwrap()
    }

    #[test]
    fn test_complete_graph_minimum() {
        // Direct arc plus one two-hop path through each other node
        let graph = complete_graph(4, 2);
        let report = compute_all_pairs_minimum(&graph, false, 1).unwrap();
        assert_eq!(report.minimum, 6);
        assert_eq!(report.weakest_pair, (0, 1));
        assert_eq!(report.pairs_solved, 12);
        assert_eq!(report.mode, ExecutionMode::Sequential);
    }

    #[test]
    fn test_path_graph_weakest_pair() {
        let graph = CapacityMatrix::from_arcs(4, vec![(0, 1, 10), (1, 2, 5), (2, 3, 10)]).unwrap();
        let report = compute_all_pairs_minimum(&graph, true, 3).unwrap();
        assert_eq!(report.minimum, 0);
        assert_eq!(report.weakest_pair, (1, 0));
        assert_eq!(report.mode, ExecutionMode::parallel(3));
        assert!(report.elapsed_seconds() >= 0.0);
    }

    #[test]
    fn test_sequential_and_parallel_agree() {
        let graph = CapacityMatrix::from_rows(&[
            vec![0, 4, 0, 3, 0, 1],
            vec![2, 0, 6, 0, 0, 0],
            vec![0, 1, 0, 5, 2, 0],
            vec![0, 0, 3, 0, 4, 2],
            vec![1, 0, 0, 2, 0, 7],
            vec![3, 2, 0, 0, 1, 0],
        ])
        .unwrap();
        let sequential = compute_all_pairs_minimum(&graph, false, 1).unwrap();
        for workers in [1, 2, 5] {
            for chunk_size in [None, Some(1), Some(7), Some(100)] {
                let driver = AllPairsDriver::new(DriverConfig {
                    mode: ExecutionMode::parallel(workers),
                    chunk_size,
                    verify_invariants: true,
                    ..DriverConfig::default()
                });
                let parallel = driver.run(&graph).unwrap();
                assert_eq!(parallel.minimum, sequential.minimum);
                assert_eq!(parallel.weakest_pair, sequential.weakest_pair);
                assert_eq!(parallel.pairs_solved, sequential.pairs_solved);
                assert_eq!(parallel.metrics, sequential.metrics);
            }
        }
    }

    #[test]
    fn test_reference_engine_agrees() {
        let graph = complete_graph(5, 3);
        let driver = AllPairsDriver::new(DriverConfig {
            algorithm: MaxFlowAlgorithm::EdmondsKarp,
            ..DriverConfig::default()
        });
        let reference = driver.run(&graph).unwrap();
        let report = compute_all_pairs_minimum(&graph, false, 1).unwrap();
        assert_eq!(reference.minimum, 12);
        assert_eq!(report.minimum, reference.minimum);
    }

    #[test]
    fn test_single_node_has_no_pairs() {
        let graph = CapacityMatrix::from_rows(&[vec![0]]).unwrap();
        assert_eq!(
            compute_all_pairs_minimum(&graph, false, 1),
            Err(FlowError::NoPairs { node_count: 1 })
        );
        assert_eq!(
            compute_all_pairs_minimum(&graph, true, 4),
            Err(FlowError::NoPairs { node_count: 1 })
        );
    }

    #[test]
    fn test_zero_workers_rejected() {
        let graph = complete_graph(3, 1);
        assert_eq!(
            compute_all_pairs_minimum(&graph, true, 0),
            Err(FlowError::InvalidWorkerCount(0))
        );
        assert!(compute_all_pairs_minimum(&graph, false, 0).is_ok());
    }

    /// Reports a negative capacity the matrix constructor would have refused
    struct CorruptGraph;

    impl CapacityGraph for CorruptGraph {
        fn node_count(&self) -> usize {
            4
        }

        fn capacity(&self, from: NodeId, to: NodeId) -> Capacity {
            if from == 2 && to == 3 {
                -1
            } else if from != to {
                1
            } else {
                0
            }
        }
    }

    #[test]
    fn test_invariant_violation_aborts_parallel_run() {
        let driver = AllPairsDriver::new(DriverConfig {
            mode: ExecutionMode::parallel(2),
            chunk_size: Some(1),
            verify_invariants: true,
            ..DriverConfig::default()
        });
        let error = driver.run(&CorruptGraph).unwrap_err();
        assert!(matches!(
            error,
            FlowError::InvariantViolation(InvariantViolation::CapacityExceeded { from: 2, to: 3, .. })
        ));
        assert!(!error.is_invalid_input());
    }

    #[test]
    fn test_pair_flow_minimum_is_order_independent() {
        let a = Some(PairFlow { source: 0, sink: 2, value: 4 });
        let b = Some(PairFlow { source: 1, sink: 0, value: 4 });
        let c = Some(PairFlow { source: 2, sink: 1, value: 9 });

        assert_eq!(PairFlow::min_of(a, b), PairFlow::min_of(b, a));
        assert_eq!(PairFlow::min_of(a, b), a);
        assert_eq!(
            PairFlow::min_of(PairFlow::min_of(a, b), c),
            PairFlow::min_of(a, PairFlow::min_of(b, c))
        );
        assert_eq!(PairFlow::min_of(None, c), c);
        assert_eq!(PairFlow::min_of(None, None), None);
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = DriverConfig {
            mode: ExecutionMode::parallel(8),
            algorithm: MaxFlowAlgorithm::EdmondsKarp,
            chunk_size: Some(16),
            verify_invariants: true,
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(serde_json::from_str::<DriverConfig>(&json).unwrap(), config);

        let partial: DriverConfig = serde_json::from_str(r#"{"mode":{"kind":"parallel","workers":3}}"#).unwrap();
        assert_eq!(partial.mode, ExecutionMode::parallel(3));
        assert_eq!(partial.algorithm, MaxFlowAlgorithm::PushRelabelFifo);
    }
}

/// Property-based testing
#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::data_structures::graph::CapacityMatrix;
    use quickcheck::{quickcheck, TestResult};
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn random_graph(rng: &mut Xoshiro256PlusPlus, n: usize, density: f64) -> CapacityMatrix {
        let capacities = (0..n * n)
            .map(|_| if rng.gen_bool(density) { rng.gen_range(1..20) } else { 0 })
            .collect();
        CapacityMatrix::from_row_major(n, capacities).unwrap()
    }

    #[test]
    fn test_seeded_graphs_match_reference() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0x5eed);
        for n in [2, 5, 9, 12] {
            let graph = random_graph(&mut rng, n, 0.6);
            let reference = AllPairsDriver::new(DriverConfig {
                algorithm: MaxFlowAlgorithm::EdmondsKarp,
                ..DriverConfig::default()
            })
            .run(&graph)
            .unwrap();
            let parallel = compute_all_pairs_minimum(&graph, true, 4).unwrap();
            assert_eq!(parallel.minimum, reference.minimum);
            assert_eq!(parallel.weakest_pair, reference.weakest_pair);
        }
    }

    quickcheck! {
        fn prop_sequential_equals_parallel(seed: u64, size: u8, workers: u8) -> TestResult {
            let n = 2 + (size % 8) as usize;
            let workers = 1 + (workers % 4) as usize;
            let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
            let graph = random_graph(&mut rng, n, 0.4);

            let sequential = compute_all_pairs_minimum(&graph, false, 1);
            let parallel = compute_all_pairs_minimum(&graph, true, workers);
            match (sequential, parallel) {
                (Ok(s), Ok(p)) => TestResult::from_bool(
                    s.minimum == p.minimum && s.weakest_pair == p.weakest_pair
                ),
                _ => TestResult::failed(),
            }
        }

        fn prop_minimum_invariant_under_relabeling(seed: u64, size: u8) -> TestResult {
            let n = 2 + (size % 8) as usize;
            let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
            let graph = random_graph(&mut rng, n, 0.5);
            let mut permutation: Vec<NodeId> = (0..n).collect();
            permutation.shuffle(&mut rng);
            let permuted = match graph.permuted(&permutation) {
                Ok(permuted) => permuted,
                Err(_) => return TestResult::failed(),
            };

            match (
                compute_all_pairs_minimum(&graph, false, 1),
                compute_all_pairs_minimum(&permuted, true, 2),
            ) {
                (Ok(a), Ok(b)) => TestResult::from_bool(a.minimum == b.minimum),
                _ => TestResult::failed(),
            }
        }
    }
}
