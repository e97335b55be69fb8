//! Error types for the subgraph spectra pipeline.
//!
//! ```text
//! PipelineError
//! ├── Config       (invalid or unreadable configuration)
//! ├── Load         (input missing, unreadable, or required columns absent)
//! ├── Partition    (K is zero or larger than the node universe)
//! ├── Computation  (eigen-decomposition failed for one partition)
//! └── Serialize    (artifact could not be written or read back)
//! ```
//!
//! Any of these aborts the run; nothing is persisted on failure.

use std::path::PathBuf;

use thiserror::Error;

/// Convenient `Result` alias for stage-level functions.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Top-level error type. Every message names the stage that failed.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The configuration is invalid or could not be read.
    #[error("config: {0}")]
    Config(String),

    /// The input table could not be loaded.
    #[error("load: cannot read relationship table `{path}`: {source:#}")]
    Load {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// No partition can be formed from the requested count.
    #[error(
        "partition: cannot split {universe} nodes into {requested} groups (group size would be {group_size})"
    )]
    Partition {
        requested: usize,
        universe: usize,
        group_size: usize,
    },

    /// The spectrum of one partition could not be computed.
    #[error("spectrum: partition {partition} ({nodes} nodes): {message}")]
    Computation {
        partition: usize,
        nodes: usize,
        message: String,
    },

    /// The dataset artifact could not be written or read.
    #[error("serialize: `{path}`: {message}")]
    Serialize { path: PathBuf, message: String },
}

impl PipelineError {
    /// Construct a [`PipelineError::Load`].
    pub fn load(path: impl Into<PathBuf>, source: anyhow::Error) -> Self {
        PipelineError::Load {
            path: path.into(),
            source,
        }
    }

    /// Construct a [`PipelineError::Computation`].
    pub fn computation<S: Into<String>>(partition: usize, nodes: usize, msg: S) -> Self {
        PipelineError::Computation {
            partition,
            nodes,
            message: msg.into(),
        }
    }

    /// Construct a [`PipelineError::Serialize`].
    pub fn serialize<S: Into<String>>(path: impl Into<PathBuf>, msg: S) -> Self {
        PipelineError::Serialize {
            path: path.into(),
            message: msg.into(),
        }
    }
}
