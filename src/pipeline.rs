use std::path::{Path, PathBuf};
use std::time::Instant;

use log::{debug, info};
use rayon::prelude::*;

use crate::config::PipelineConfig;
use crate::data::loader::load_file;
use crate::data::model::RelationTable;
use crate::dataset::Dataset;
use crate::error::{PipelineError, PipelineResult};
use crate::graph::adjacency::EndpointIndex;
use crate::graph::partition::{drop_trailing, partition_nodes, Partition};
use crate::graph::spectrum::SpectrumPolicy;
use crate::graph::{process_partition, PartitionSpectrum};

// ---------------------------------------------------------------------------
// Run summary
// ---------------------------------------------------------------------------

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSummary {
    pub rows_read: usize,
    pub rows_dropped: usize,
    pub universe_size: usize,
    pub group_size: usize,
    pub partitions_retained: usize,
    pub max_num_nodes: usize,
    pub output: PathBuf,
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// Partitioning result handed to the per-partition stage.
#[derive(Debug, Clone)]
pub struct PartitionPlan {
    pub universe_size: usize,
    pub group_size: usize,
    pub partitions: Vec<Partition>,
}

/// Derive the node universe, split it, and apply the trailing-drop policy.
pub fn plan_partitions(
    table: &RelationTable,
    requested: usize,
    cfg: &PipelineConfig,
) -> PipelineResult<PartitionPlan> {
    let universe = table.node_universe();
    let mut partitioning = partition_nodes(&universe, requested)?;

    if cfg.drop_trailing_twice {
        drop_trailing(&mut partitioning.partitions);
    }

    Ok(PartitionPlan {
        universe_size: universe.len(),
        group_size: partitioning.group_size,
        partitions: partitioning.partitions,
    })
}

/// Adjacency and spectrum for every partition, in partition order.
///
/// Work is spread over the current rayon pool; the indexed collect keeps
/// output order independent of completion order, and the first error wins.
pub fn compute_spectra(
    table: &RelationTable,
    partitions: &[Partition],
    policy: SpectrumPolicy,
) -> PipelineResult<Vec<PartitionSpectrum>> {
    let index = EndpointIndex::build(&table.records);
    debug!("endpoint index over {} sources", index.source_count());

    partitions
        .par_iter()
        .map(|p| process_partition(p, &index, policy))
        .collect()
}

/// Load → partition → adjacency + spectrum → aggregate, without writing.
pub fn compute(
    input: &Path,
    requested: usize,
    cfg: &PipelineConfig,
) -> PipelineResult<(Dataset, PipelineSummary)> {
    cfg.validate()?;

    let table = load_file(input, cfg)?;
    let plan = plan_partitions(&table, requested, cfg)?;
    let policy = SpectrumPolicy::from_flag(cfg.symmetrize_before_spectrum);

    let started = Instant::now();
    let parts = match cfg.threads {
        Some(threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| PipelineError::Config(format!("building thread pool: {e}")))?;
            pool.install(|| compute_spectra(&table, &plan.partitions, policy))?
        }
        None => compute_spectra(&table, &plan.partitions, policy)?,
    };
    info!(
        "computed {} spectra ({policy:?}) in {:.2?}",
        parts.len(),
        started.elapsed()
    );

    let dataset = Dataset::from_partitions(parts);
    let summary = PipelineSummary {
        rows_read: table.rows_read,
        rows_dropped: table.rows_dropped,
        universe_size: plan.universe_size,
        group_size: plan.group_size,
        partitions_retained: dataset.len(),
        max_num_nodes: dataset.max_num_nodes,
        output: PathBuf::new(),
    };
    Ok((dataset, summary))
}

/// Full run: compute the dataset from `input` and persist it at `output`.
pub fn run(
    input: &Path,
    requested: usize,
    output: &Path,
    cfg: &PipelineConfig,
) -> PipelineResult<PipelineSummary> {
    let (dataset, mut summary) = compute(input, requested, cfg)?;
    dataset.save(output)?;
    summary.output = output.to_path_buf();
    Ok(summary)
}
