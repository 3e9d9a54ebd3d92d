//! Parsing Options.
//! Flags override values loaded from `--config FILE`.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{value_parser, Arg, ArgAction, Command};
use weakcut_core::optimization::parallel::default_worker_count;
use weakcut_core::{DriverConfig, ExecutionMode, MaxFlowAlgorithm, NodeId};

fn make_options_parser() -> Command {
    Command::new("weakcut")
        .about("Minimum maximum flow over every ordered pair of nodes")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("input")
                .value_name("INPUT")
                .value_parser(value_parser!(PathBuf))
                .help("Edge list file: node count, then `u v capacity` triples (stdin when absent)"),
        )
        .arg(
            Arg::new("parallel")
                .short('p')
                .long("parallel")
                .action(ArgAction::SetTrue)
                .help("Solve pairs on a pool of worker threads"),
        )
        .arg(
            Arg::new("workers")
                .short('w')
                .long("workers")
                .value_name("N")
                .value_parser(value_parser!(usize))
                .help("Worker threads for --parallel (default: available cores)"),
        )
        .arg(
            Arg::new("algorithm")
                .short('a')
                .long("algorithm")
                .value_parser(["push-relabel", "edmonds-karp"])
                .help("Per-pair max-flow engine"),
        )
        .arg(
            Arg::new("chunk-size")
                .long("chunk-size")
                .value_name("PAIRS")
                .value_parser(value_parser!(usize))
                .help("Pairs per parallel task"),
        )
        .arg(
            Arg::new("verify")
                .long("verify")
                .action(ArgAction::SetTrue)
                .help("Check flow invariants after every push and relabel"),
        )
        .arg(
            Arg::new("pair")
                .long("pair")
                .num_args(2)
                .value_names(["SOURCE", "SINK"])
                .value_parser(value_parser!(NodeId))
                .help("Solve a single pair instead of all pairs"),
        )
        .arg(
            Arg::new("print-matrix")
                .long("print-matrix")
                .action(ArgAction::SetTrue)
                .help("Print the capacity matrix before solving"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("JSON driver configuration"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Log at debug level unless RUST_LOG is set"),
        )
}

#[derive(Debug, Default)]
pub struct Options {
    pub input: Option<PathBuf>,
    pub driver: DriverConfig,
    pub pair: Option<(NodeId, NodeId)>,
    pub print_matrix: bool,
    pub verbose: bool,
}

impl Options {
    pub fn parse_from_args<I, T>(args: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let matches = make_options_parser().try_get_matches_from(args)?;

        let mut driver = match matches.get_one::<PathBuf>("config") {
            Some(path) => load_config(path)?,
            None => DriverConfig::default(),
        };

        let workers = matches.get_one::<usize>("workers").copied();
        if matches.get_flag("parallel") {
            let configured = match driver.mode {
                ExecutionMode::Parallel { workers } => workers,
                ExecutionMode::Sequential => default_worker_count(),
            };
            driver.mode = ExecutionMode::parallel(workers.unwrap_or(configured));
        } else if let (Some(workers), ExecutionMode::Parallel { .. }) = (workers, driver.mode) {
            driver.mode = ExecutionMode::parallel(workers);
        }

        match matches.get_one::<String>("algorithm").map(String::as_str) {
            Some("push-relabel") => driver.algorithm = MaxFlowAlgorithm::PushRelabelFifo,
            Some("edmonds-karp") => driver.algorithm = MaxFlowAlgorithm::EdmondsKarp,
            Some(other) => bail!("unsupported algorithm {other}"),
            None => {}
        }
        if let Some(&chunk_size) = matches.get_one::<usize>("chunk-size") {
            driver.chunk_size = Some(chunk_size);
        }
        if matches.get_flag("verify") {
            driver.verify_invariants = true;
        }

        let pair = matches
            .get_many::<NodeId>("pair")
            .map(|values| values.copied().collect::<Vec<_>>())
            .map(|values| (values[0], values[1]));

        Ok(Options {
            input: matches.get_one::<PathBuf>("input").cloned(),
            driver,
            pair,
            print_matrix: matches.get_flag("print-matrix"),
            verbose: matches.get_flag("verbose"),
        })
    }
}

fn load_config(path: &Path) -> anyhow::Result<DriverConfig> {
    let text = fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}
