//! testrollup-core — Record model, ingestion, and aggregation engine.
//!
//! This crate defines the test/session data model, decodes raw JSON input
//! into it, and folds sessions into per-DUT and overall summaries that the
//! report sinks consume.

pub mod aggregate;
pub mod error;
pub mod model;
pub mod parser;
pub mod report;

pub use aggregate::{aggregate_overall, aggregate_per_dut};
pub use error::IngestError;
pub use model::{
    DutSummary, ExtraMetrics, OverallSummary, Session, SlowTest, TestRecord, TestStatus,
};
