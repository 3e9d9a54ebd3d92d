//! Edge-list input reader
//!
//! Format: the node count `n`, followed by whitespace-separated triples
//! `u v capacity` until end of input. A repeated arc overwrites the earlier
//! capacity.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::io::Read;

use log::debug;
use weakcut_core::{Capacity, CapacityMatrix, FlowError, NodeId};

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("input is empty, expected a node count")]
    MissingNodeCount,

    #[error("invalid {what} {token:?} at token {position}")]
    InvalidToken {
        what: &'static str,
        token: String,
        position: usize,
    },

    #[error("incomplete arc at end of input: {0} trailing value(s)")]
    TruncatedArc(usize),

    #[error(transparent)]
    Graph(#[from] FlowError),
}

fn parse_token<T: std::str::FromStr>(token: &str, what: &'static str, position: usize) -> Result<T, InputError> {
    token.parse().map_err(|_| InputError::InvalidToken {
        what,
        token: token.to_string(),
        position,
    })
}

/// Parses an edge list into a capacity matrix
pub fn parse_graph(text: &str) -> Result<CapacityMatrix, InputError> {
    let mut tokens = text.split_whitespace().enumerate();

    let (position, token) = tokens.next().ok_or(InputError::MissingNodeCount)?;
    let node_count: usize = parse_token(token, "node count", position)?;

    let rest: Vec<(usize, &str)> = tokens.collect();
    let mut chunks = rest.chunks_exact(3);
    let mut arcs = Vec::new();
    for triple in chunks.by_ref() {
        let [(pu, u), (pv, v), (pc, c)] = [triple[0], triple[1], triple[2]];
        let from: NodeId = parse_token(u, "node", pu)?;
        let to: NodeId = parse_token(v, "node", pv)?;
        let capacity: Capacity = parse_token(c, "capacity", pc)?;
        arcs.push((from, to, capacity));
    }
    if !chunks.remainder().is_empty() {
        return Err(InputError::TruncatedArc(chunks.remainder().len()));
    }

    debug!("Read {} nodes and {} arc lines", node_count, arcs.len());
    Ok(CapacityMatrix::from_arcs(node_count, arcs)?)
}

/// Reads the whole of `reader` and parses it
pub fn read_graph<R: Read>(mut reader: R) -> Result<CapacityMatrix, InputError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    parse_graph(&text)
}
