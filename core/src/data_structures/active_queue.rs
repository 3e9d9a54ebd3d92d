//! FIFO worklist of active nodes for push-relabel discharge
//!
//! Backed by a ring buffer of plain node indices. A node may sit in the
//! queue several times at once; entries are never deduplicated and each
//! occurrence is handed back by `pop` in arrival order.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::VecDeque;

use crate::algorithm::traits::{FlowError, NodeId};

/// First-in first-out queue of nodes holding positive excess
#[derive(Debug, Clone, Default)]
pub struct ActiveQueue {
    entries: VecDeque<NodeId>,
}

impl ActiveQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty queue sized for `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Append `node` at the tail
    #[inline]
    pub fn push(&mut self, node: NodeId) {
        self.entries.push_back(node);
    }

    /// Remove and return the head
    ///
    /// Popping an empty queue is a caller error; check `is_empty` first.
    #[inline]
    pub fn pop(&mut self) -> Result<NodeId, FlowError> {
        self.entries.pop_front().ok_or(FlowError::EmptyQueue)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Drop every entry, keeping the allocation
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterate entries from head to tail
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.entries.iter().copied()
    }
}
