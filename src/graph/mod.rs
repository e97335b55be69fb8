//! Graph layer: partitioning, adjacency, and Laplacian spectra.
//!
//! ```text
//!   NodeUniverse ──► partition ──► Vec<Partition>
//!                                      │  (one task per partition)
//!   Vec<Record> ──► EndpointIndex ─────┤
//!                                      ▼
//!                                 adjacency ──► spectrum ──► PartitionSpectrum
//! ```

pub mod adjacency;
pub mod matrix;
pub mod partition;
pub mod spectrum;

use log::debug;

use crate::error::PipelineResult;
use adjacency::{build_adjacency, EndpointIndex};
use matrix::Matrix;
use partition::Partition;
use spectrum::{laplacian_spectrum, SpectrumPolicy};

/// Everything computed for one retained partition.
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionSpectrum {
    /// Index of the partition this was computed from.
    pub index: usize,
    pub adjacency: Matrix<u8>,
    pub eigenvalues: Vec<f64>,
    pub eigenvectors: Matrix<f64>,
}

impl PartitionSpectrum {
    pub fn num_nodes(&self) -> usize {
        self.adjacency.nrows()
    }
}

/// Build the adjacency matrix of `partition` and decompose its Laplacian.
pub fn process_partition(
    partition: &Partition,
    index: &EndpointIndex<'_>,
    policy: SpectrumPolicy,
) -> PipelineResult<PartitionSpectrum> {
    let adjacency = build_adjacency(partition, index);
    debug!(
        "partition {}: {} nodes, {} edges",
        partition.index,
        partition.len(),
        adjacency.count_nonzero()
    );

    let spectrum = laplacian_spectrum(&adjacency, policy, partition.index)?;

    Ok(PartitionSpectrum {
        index: partition.index,
        adjacency,
        eigenvalues: spectrum.eigenvalues,
        eigenvectors: spectrum.eigenvectors,
    })
}
