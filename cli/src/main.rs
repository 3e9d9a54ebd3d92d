//! WEAKCUT command-line front end
//!
//! Reads an edge list, then prints either the max flow of one pair or the
//! minimum over all ordered pairs together with the elapsed time.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

mod input;
mod options;

use std::fs::File;
use std::io::{self, BufReader, Write};

use anyhow::Context;
use log::info;
use weakcut_core::{AllPairsDriver, AllPairsReport, CapacityGraph, CapacityMatrix, Flow, NodeId};

use crate::options::Options;

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .init();
}

fn load_graph(options: &Options) -> anyhow::Result<CapacityMatrix> {
    match &options.input {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            input::read_graph(BufReader::new(file)).with_context(|| format!("reading graph from {}", path.display()))
        }
        None => input::read_graph(io::stdin().lock()).context("reading graph from stdin"),
    }
}

fn write_pair(out: &mut impl Write, (source, sink): (NodeId, NodeId), value: Flow) -> io::Result<()> {
    writeln!(out, "max flow {} -> {}: {}", source, sink, value)
}

fn write_report(out: &mut impl Write, report: &AllPairsReport) -> io::Result<()> {
    writeln!(out, "minimum max flow: {}", report.minimum)?;
    writeln!(
        out,
        "weakest pair: {} -> {}",
        report.weakest_pair.0, report.weakest_pair.1
    )?;
    writeln!(out, "pairs solved: {}", report.pairs_solved)?;
    writeln!(out, "elapsed: {:.6} s", report.elapsed_seconds())
}

fn run(options: &Options) -> anyhow::Result<()> {
    let graph = load_graph(options)?;
    info!(
        "Loaded graph with {} nodes and {} arcs",
        graph.node_count(),
        graph.arc_count()
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if options.print_matrix {
        write!(out, "{}", graph)?;
    }

    match options.pair {
        Some((source, sink)) => {
            let mut engine = options
                .driver
                .algorithm
                .engine(&graph, options.driver.verify_invariants);
            let value = engine
                .solve(source, sink)
                .with_context(|| format!("solving pair {} -> {}", source, sink))?;
            write_pair(&mut out, (source, sink), value)?;
        }
        None => {
            let report = AllPairsDriver::new(options.driver.clone())
                .run(&graph)
                .context("solving all pairs")?;
            write_report(&mut out, &report)?;
        }
    }
    Ok(())
}

fn main() {
    let options = match Options::parse_from_args(std::env::args_os()) {
        Ok(options) => options,
        Err(error) => {
            if let Some(clap_error) = error.downcast_ref::<clap::Error>() {
                clap_error.exit();
            }
            eprintln!("error: {:#}", error);
            std::process::exit(2);
        }
    };
    init_logging(options.verbose);

    if let Err(error) = run(&options) {
        eprintln!("error: {:#}", error);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use weakcut_core::{ExecutionMode, FlowMetrics};

    #[test]
    fn test_report_format() {
        let report = AllPairsReport {
            minimum: 3,
            weakest_pair: (1, 2),
            pairs_solved: 6,
            elapsed: Duration::from_millis(1500),
            mode: ExecutionMode::Sequential,
            metrics: FlowMetrics::default(),
        };
        let mut out = Vec::new();
        write_report(&mut out, &report).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "minimum max flow: 3\nweakest pair: 1 -> 2\npairs solved: 6\nelapsed: 1.500000 s\n"
        );
    }

    #[test]
    fn test_pair_format() {
        let mut out = Vec::new();
        write_pair(&mut out, (0, 3), 5).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "max flow 0 -> 3: 5\n");
    }
}
