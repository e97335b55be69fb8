use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use subgraph_spectra::{run, PipelineConfig};

/// Partition a relationship table into subgraphs and export their
/// Laplacian spectra as one dataset artifact.
#[derive(Parser, Debug)]
#[command(name = "subgraph-spectra", version, about, long_about = None)]
struct Args {
    /// Relationship table (.csv, .json, .parquet).
    input: PathBuf,

    /// Requested number of groups; group size is nodes / K.
    num_graphs: usize,

    /// Output artifact (.json or .bin).
    output: PathBuf,

    /// JSON configuration file.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the entity column name.
    #[arg(long)]
    entity_column: Option<String>,

    /// Override the counterparty column name.
    #[arg(long)]
    counterparty_column: Option<String>,

    /// Keep the last partition that is otherwise dropped a second time.
    #[arg(long, default_value_t = false)]
    keep_trailing: bool,

    /// Symmetrize the Laplacian before the eigen-decomposition.
    #[arg(long, default_value_t = false)]
    symmetrize: bool,

    /// Worker threads for per-partition work.
    #[arg(long)]
    threads: Option<usize>,

    /// Log level when RUST_LOG is unset (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .init();

    let mut config = match args.config.as_deref() {
        Some(path) => PipelineConfig::from_json(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(col) = args.entity_column {
        config.entity_column = col;
    }
    if let Some(col) = args.counterparty_column {
        config.counterparty_column = col;
    }
    if args.keep_trailing {
        config.drop_trailing_twice = false;
    }
    if args.symmetrize {
        config.symmetrize_before_spectrum = true;
    }
    if args.threads.is_some() {
        config.threads = args.threads;
    }

    let summary = run(&args.input, args.num_graphs, &args.output, &config)
        .with_context(|| format!("processing {}", args.input.display()))?;

    info!(
        "{} relationships, {} nodes, group size {}, {} partitions (max {} nodes) → {}",
        summary.rows_read - summary.rows_dropped,
        summary.universe_size,
        summary.group_size,
        summary.partitions_retained,
        summary.max_num_nodes,
        summary.output.display()
    );
    Ok(())
}
