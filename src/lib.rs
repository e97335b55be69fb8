//! Turn a relationship table (entity → counterparty) into per-subgraph
//! Laplacian spectra.
//!
//! ```text
//!  loader ──► partition ──► adjacency ──► spectrum ──► dataset
//! ```
//!
//! [`pipeline::run`] drives the whole chain; each stage is also usable on
//! its own.

pub mod config;
pub mod data;
pub mod dataset;
pub mod error;
pub mod graph;
pub mod pipeline;

pub use config::PipelineConfig;
pub use dataset::Dataset;
pub use error::{PipelineError, PipelineResult};
pub use pipeline::{run, PipelineSummary};
