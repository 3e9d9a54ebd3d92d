//! Parallel Partitioning of the All-Pairs Index Space
//!
//! The all-pairs computation is embarrassingly parallel: every ordered
//! pair `(s, t)` with `s != t` is an independent task. This module maps
//! the `n * (n - 1)` pairs onto a dense index range, cuts that range into
//! contiguous chunks, and builds the fixed-size worker pool the chunks are
//! scheduled on.
//!
//! # Scheduling Properties
//! - Chunks are disjoint and cover the index range exactly once
//! - Each chunk is processed by one task with its own engine buffers
//! - Results are combined by an associative, commutative reduction, so
//!   chunk completion order never affects the outcome
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::ops::Range;

use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::algorithm::traits::{FlowError, NodeId};

/// Chunks scheduled per worker when no explicit chunk size is given
pub const CHUNKS_PER_WORKER: usize = 4;

/// Dense enumeration of ordered pairs of distinct nodes
///
/// Index `k` maps to source `k / (n - 1)` and the `k % (n - 1)`-th node
/// other than that source, so pairs come out in lexicographic order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairIndexSpace {
    node_count: usize,
}

impl PairIndexSpace {
    pub fn new(node_count: usize) -> Self {
        Self { node_count }
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Number of ordered pairs `n * (n - 1)`
    pub fn len(&self) -> usize {
        self.node_count * self.node_count.saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The pair at `index`; `index` must be below `len()`
    #[inline]
    pub fn pair_at(&self, index: usize) -> (NodeId, NodeId) {
        debug_assert!(index < self.len());
        let others = self.node_count - 1;
        let source = index / others;
        let offset = index % others;
        let sink = if offset < source { offset } else { offset + 1 };
        (source, sink)
    }

    /// Pairs for a sub-range of indices
    pub fn pairs(&self, range: Range<usize>) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        range.map(move |index| self.pair_at(index))
    }

    /// Every pair in lexicographic order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.pairs(0..self.len())
    }
}

/// Partition of a pair index space into contiguous chunks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkPlan {
    space: PairIndexSpace,
    chunk_size: usize,
}

impl ChunkPlan {
    /// Plan chunks of `chunk_size` pairs, or derive a size from `workers`
    pub fn new(space: PairIndexSpace, workers: usize, chunk_size: Option<usize>) -> Self {
        let derived = space.len().div_ceil(workers.max(1) * CHUNKS_PER_WORKER);
        let chunk_size = chunk_size.unwrap_or(derived).max(1);
        Self { space, chunk_size }
    }

    pub fn space(&self) -> PairIndexSpace {
        self.space
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_count(&self) -> usize {
        self.space.len().div_ceil(self.chunk_size)
    }

    /// Index ranges of all chunks, in order
    pub fn chunks(&self) -> Vec<Range<usize>> {
        let total = self.space.len();
        (0..total)
            .step_by(self.chunk_size)
            .map(|start| start..(start + self.chunk_size).min(total))
            .collect()
    }
}

/// Builds a dedicated pool of `workers` threads
pub fn build_worker_pool(workers: usize) -> Result<ThreadPool, FlowError> {
    if workers == 0 {
        return Err(FlowError::InvalidWorkerCount(workers));
    }
    ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|index| format!("weakcut-worker-{}", index))
        .build()
        .map_err(|error| FlowError::ThreadPool(error.to_string()))
}

/// Number of workers to use when the caller does not choose
pub fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|count| count.get())
        .unwrap_or(1)
}
