//! Data layer: core types, loading, and missing-value filtering.
//!
//! Architecture:
//! ```text
//!  .csv / .json / .parquet / .xlsx / .xls
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → RawRow (entity, counterparty)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  drop rows with a missing field
//!   └──────────┘
//!        │
//!        ▼
//!   ┌───────────────┐
//!   │ RelationTable  │  Vec<Record>, node universe
//!   └───────────────┘
//! ```

pub mod filter;
pub mod loader;
pub mod model;
