//! Preflow Correctness Verification
//!
//! Checks the push-relabel invariants directly against a [`FlowState`].
//! The solver calls these after every push and relabel when invariant
//! verification is enabled; tests call them on finished states.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use crate::algorithm::graph::max_flow::{FlowState, NodeRole, Terminals};
use crate::algorithm::traits::{CapacityGraph, Flow, InvariantViolation};

/// Verifies feasibility, antisymmetry, valid labeling and excess bookkeeping
pub fn check_preflow<G>(graph: &G, state: &FlowState, terminals: Terminals) -> Result<(), InvariantViolation>
where
    G: CapacityGraph + ?Sized,
{
    let n = graph.node_count();

    if state.height(terminals.source) != n {
        return Err(InvariantViolation::SourceHeight {
            height: state.height(terminals.source),
            expected: n,
        });
    }

    for from in 0..n {
        for to in 0..n {
            if from == to {
                continue;
            }
            let flow = state.flow(from, to);
            let capacity = graph.capacity(from, to);

            if flow > capacity {
                return Err(InvariantViolation::CapacityExceeded {
                    from,
                    to,
                    flow,
                    capacity,
                });
            }
            if flow != -state.flow(to, from) {
                return Err(InvariantViolation::Antisymmetry {
                    from,
                    to,
                    forward: flow,
                    reverse: state.flow(to, from),
                });
            }
            if capacity - flow > 0 && state.height(from) > state.height(to) + 1 {
                return Err(InvariantViolation::HeightAdmissibility {
                    from,
                    to,
                    from_height: state.height(from),
                    to_height: state.height(to),
                });
            }
        }
    }

    for node in 0..n {
        if terminals.role(node) == NodeRole::Source {
            continue;
        }
        let net_inflow: Flow = (0..n).map(|u| state.flow(u, node)).sum();
        if net_inflow != state.excess(node) || state.excess(node) < 0 {
            return Err(InvariantViolation::ExcessMismatch {
                node,
                recorded: state.excess(node),
                net_inflow,
            });
        }
    }

    Ok(())
}

/// Verifies a drained state: a valid preflow with no interior excess
pub fn check_terminated<G>(graph: &G, state: &FlowState, terminals: Terminals) -> Result<(), InvariantViolation>
where
    G: CapacityGraph + ?Sized,
{
    check_preflow(graph, state, terminals)?;

    (0..graph.node_count())
        .filter(|&node| terminals.is_interior(node))
        .find(|&node| state.excess(node) != 0)
        .map_or(Ok(()), |node| {
            Err(InvariantViolation::ResidualExcess {
                node,
                excess: state.excess(node),
            })
        })
}
