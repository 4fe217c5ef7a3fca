//! `gapview-recon` — Indicator reconciliation engine.
//!
//! Pure engine crate: receives wide per-indicator tables, returns one tidy
//! dataset keyed by (entity, period). No filesystem or CLI dependencies.

pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod fill;
pub mod ingest;
pub mod join;
pub mod model;
pub mod reshape;
pub mod view;

pub use config::PipelineConfig;
pub use engine::{reconcile, run};
pub use error::ReconError;
pub use ingest::{parse_source_table, IngestOptions};
pub use model::{
    LongRow, LongTable, Period, ReconResult, ReconciledDataset, SourceTable, Sources, TidyRecord,
};
pub use view::{ChartSpec, EmptySelection, Scale, ScatterPoint, Selection};
