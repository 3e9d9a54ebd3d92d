//! Dense capacity matrix for flow networks
//!
//! The matrix is row-major over `n * n` entries and is frozen once built:
//! every engine reads it through the [`CapacityGraph`] trait and no method
//! hands out mutable access, so a single matrix can be shared by reference
//! across all workers of a parallel run.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::fmt;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::algorithm::traits::{Capacity, CapacityGraph, FlowError, NodeId};

/// Immutable `n x n` table of non-negative arc capacities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityMatrix {
    /// Number of nodes
    node_count: usize,
    /// Row-major capacities, `capacities[u * n + v]` is arc `u -> v`
    capacities: Vec<Capacity>,
}

impl CapacityMatrix {
    /// Builds a matrix from row-major capacities
    ///
    /// Negative entries are rejected, and so is a node whose outgoing plus
    /// incoming capacities overflow [`Capacity`]. Nonzero diagonal entries
    /// are zeroed with a warning.
    pub fn from_row_major(node_count: usize, mut capacities: Vec<Capacity>) -> Result<Self, FlowError> {
        if node_count == 0 {
            return Err(FlowError::EmptyGraph);
        }
        let expected = node_count * node_count;
        if capacities.len() != expected {
            return Err(FlowError::DimensionMismatch {
                expected,
                found: capacities.len(),
            });
        }

        for (index, &capacity) in capacities.iter().enumerate() {
            if capacity < 0 {
                return Err(FlowError::NegativeCapacity {
                    from: index / node_count,
                    to: index % node_count,
                    capacity,
                });
            }
        }

        let mut dropped_loops = 0usize;
        for node in 0..node_count {
            let slot = &mut capacities[node * node_count + node];
            if *slot != 0 {
                dropped_loops += 1;
                *slot = 0;
            }
        }
        if dropped_loops > 0 {
            warn!("Ignoring {} self-loop capacity entries", dropped_loops);
        }

        let mut incident: Vec<Capacity> = vec![0; node_count];
        for (index, &capacity) in capacities.iter().enumerate() {
            for node in [index / node_count, index % node_count] {
                incident[node] = incident[node]
                    .checked_add(capacity)
                    .ok_or(FlowError::CapacityOverflow { node })?;
            }
        }

        Ok(Self {
            node_count,
            capacities,
        })
    }

    /// Builds a matrix from nested rows
    pub fn from_rows(rows: &[Vec<Capacity>]) -> Result<Self, FlowError> {
        let node_count = rows.len();
        let mut capacities = Vec::with_capacity(node_count * node_count);
        for row in rows {
            if row.len() != node_count {
                return Err(FlowError::DimensionMismatch {
                    expected: node_count,
                    found: row.len(),
                });
            }
            capacities.extend_from_slice(row);
        }
        Self::from_row_major(node_count, capacities)
    }

    /// Builds a matrix from an arc list; a repeated arc keeps the last capacity
    pub fn from_arcs<I>(node_count: usize, arcs: I) -> Result<Self, FlowError>
    where
        I: IntoIterator<Item = (NodeId, NodeId, Capacity)>,
    {
        if node_count == 0 {
            return Err(FlowError::EmptyGraph);
        }
        let mut capacities = vec![0; node_count * node_count];
        for (from, to, capacity) in arcs {
            for node in [from, to] {
                if node >= node_count {
                    return Err(FlowError::NodeOutOfRange { node, node_count });
                }
            }
            capacities[from * node_count + to] = capacity;
        }
        Self::from_row_major(node_count, capacities)
    }

    /// Renumbers nodes so that old node `v` becomes `permutation[v]`
    ///
    /// `permutation` must be a bijection on `[0, n)`.
    pub fn permuted(&self, permutation: &[NodeId]) -> Result<Self, FlowError> {
        let n = self.node_count;
        if permutation.len() != n {
            return Err(FlowError::DimensionMismatch {
                expected: n,
                found: permutation.len(),
            });
        }
        let mut seen = vec![false; n];
        for &image in permutation {
            if image >= n || seen[image] {
                return Err(FlowError::InvalidPermutation(image));
            }
            seen[image] = true;
        }

        let mut capacities = vec![0; n * n];
        for u in 0..n {
            for v in 0..n {
                capacities[permutation[u] * n + permutation[v]] = self.capacities[u * n + v];
            }
        }
        Ok(Self {
            node_count: n,
            capacities,
        })
    }

    /// Row `from` of the matrix: capacities of all arcs leaving `from`
    #[inline]
    pub fn row(&self, from: NodeId) -> &[Capacity] {
        let start = from * self.node_count;
        &self.capacities[start..start + self.node_count]
    }

    /// Number of arcs with positive capacity
    pub fn arc_count(&self) -> usize {
        self.capacities.iter().filter(|&&c| c > 0).count()
    }
}

impl CapacityGraph for CapacityMatrix {
    #[inline]
    fn node_count(&self) -> usize {
        self.node_count
    }

    #[inline]
    fn capacity(&self, from: NodeId, to: NodeId) -> Capacity {
        self.capacities[from * self.node_count + to]
    }
}

/// Prints rows of space-separated capacities, one row per line
impl fmt::Display for CapacityMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for from in 0..self.node_count {
            for capacity in self.row(from) {
                write!(f, "{} ", capacity)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_from_arcs() {
        let matrix = CapacityMatrix::from_arcs(3, vec![(0, 1, 4), (1, 2, 6)]).unwrap();
        assert_eq!(matrix.node_count(), 3);
        assert_eq!(matrix.capacity(0, 1), 4);
        assert_eq!(matrix.capacity(1, 0), 0);
        assert_eq!(matrix.capacity(1, 2), 6);
        assert_eq!(matrix.arc_count(), 2);
    }

    #[test]
    fn test_repeated_arc_keeps_last_capacity() {
        let matrix = CapacityMatrix::from_arcs(2, vec![(0, 1, 4), (0, 1, 9)]).unwrap();
        assert_eq!(matrix.capacity(0, 1), 9);
    }

    #[test]
    fn test_self_loops_are_zeroed() {
        let matrix = CapacityMatrix::from_rows(&[vec![5, 1], vec![2, 3]]).unwrap();
        assert_eq!(matrix.capacity(0, 0), 0);
        assert_eq!(matrix.capacity(1, 1), 0);
        assert_eq!(matrix.capacity(0, 1), 1);
        assert_eq!(matrix.capacity(1, 0), 2);
    }

    #[test]
    fn test_invalid_construction() {
        assert_eq!(
            CapacityMatrix::from_row_major(0, Vec::new()),
            Err(FlowError::EmptyGraph)
        );
        assert_eq!(
            CapacityMatrix::from_row_major(2, vec![0, 1, 2]),
            Err(FlowError::DimensionMismatch { expected: 4, found: 3 })
        );
        assert_eq!(
            CapacityMatrix::from_arcs(2, vec![(0, 1, -3)]),
            Err(FlowError::NegativeCapacity { from: 0, to: 1, capacity: -3 })
        );
        assert_eq!(
            CapacityMatrix::from_arcs(2, vec![(0, 2, 1)]),
            Err(FlowError::NodeOutOfRange { node: 2, node_count: 2 })
        );
    }

    #[test]
    fn test_incident_capacity_overflow_rejected() {
        assert_eq!(
            CapacityMatrix::from_arcs(3, vec![(0, 1, i64::MAX), (0, 2, i64::MAX), (1, 2, i64::MAX)]),
            Err(FlowError::CapacityOverflow { node: 0 })
        );
        // Opposing arcs share both endpoints' sums
        let err = CapacityMatrix::from_arcs(2, vec![(0, 1, i64::MAX), (1, 0, 1)]).unwrap_err();
        assert_eq!(err, FlowError::CapacityOverflow { node: 1 });
        assert!(err.is_invalid_input());

        let half = i64::MAX / 2;
        let matrix = CapacityMatrix::from_arcs(3, vec![(0, 1, half), (1, 2, half)]).unwrap();
        assert_eq!(matrix.capacity(1, 2), half);
    }

    #[test]
    fn test_permutation_moves_arcs() {
        let matrix = CapacityMatrix::from_arcs(3, vec![(0, 1, 7), (1, 2, 3)]).unwrap();
        let permuted = matrix.permuted(&[2, 0, 1]).unwrap();
        assert_eq!(permuted.capacity(2, 0), 7);
        assert_eq!(permuted.capacity(0, 1), 3);
        assert_eq!(permuted.arc_count(), 2);

        assert_eq!(matrix.permuted(&[0, 0, 1]), Err(FlowError::InvalidPermutation(0)));
        assert!(matrix.permuted(&[0, 1]).is_err());
    }

    #[test]
    fn test_display_rows() {
        let matrix = CapacityMatrix::from_arcs(2, vec![(0, 1, 7)]).unwrap();
        assert_eq!(matrix.to_string(), "0 7 \n0 0 \n");
    }
}
