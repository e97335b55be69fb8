//! Splitting the node universe into fixed-size groups.
//!
//! With `n` nodes and `k` requested groups the group size is `n / k`. The
//! universe is cut into consecutive chunks of that size and the final chunk
//! is always discarded, short or not. A second drop of the last retained
//! group is applied by [`drop_trailing`] when the pipeline asks for it.

use std::collections::HashMap;

use log::{debug, info};

use crate::data::model::NodeUniverse;
use crate::error::{PipelineError, PipelineResult};

// ---------------------------------------------------------------------------
// NodeIndex – partition-scoped id ↔ dense index lookup
// ---------------------------------------------------------------------------

/// Bidirectional identifier ↔ dense-index map for one partition.
#[derive(Debug, Clone, Default)]
pub struct NodeIndex {
    ids: Vec<String>,
    positions: HashMap<String, usize>,
}

impl NodeIndex {
    pub fn new(ids: Vec<String>) -> Self {
        let positions = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();
        NodeIndex { ids, positions }
    }

    /// Dense index of `id`, if it is a member.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Partition
// ---------------------------------------------------------------------------

/// One fixed-size group of nodes, processed as an independent subgraph.
#[derive(Debug, Clone)]
pub struct Partition {
    /// Position of this group in the partitioning order.
    pub index: usize,
    pub nodes: NodeIndex,
}

impl Partition {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Group size and partitions produced for a universe.
#[derive(Debug, Clone)]
pub struct Partitioning {
    pub group_size: usize,
    pub partitions: Vec<Partition>,
}

/// Split `universe` into `requested` consecutive groups of `len / requested`
/// nodes and discard the final group.
pub fn partition_nodes(universe: &NodeUniverse, requested: usize) -> PipelineResult<Partitioning> {
    let group_size = universe.len().checked_div(requested).unwrap_or(0);
    if group_size == 0 {
        return Err(PipelineError::Partition {
            requested,
            universe: universe.len(),
            group_size,
        });
    }

    let mut partitions: Vec<Partition> = universe
        .as_slice()
        .chunks(group_size)
        .enumerate()
        .map(|(index, chunk)| Partition {
            index,
            nodes: NodeIndex::new(chunk.to_vec()),
        })
        .collect();

    let formed = partitions.len();
    partitions.pop();

    info!(
        "partitioned {} nodes into {formed} groups of {group_size}; {} retained after dropping the final group",
        universe.len(),
        partitions.len()
    );

    Ok(Partitioning {
        group_size,
        partitions,
    })
}

/// Drop the last partition, if any. Returns the dropped partition's index.
pub fn drop_trailing(partitions: &mut Vec<Partition>) -> Option<usize> {
    let dropped = partitions.pop().map(|p| p.index);
    match dropped {
        Some(idx) => debug!("dropped trailing partition {idx}"),
        None => debug!("no partition left to drop"),
    }
    dropped
}
