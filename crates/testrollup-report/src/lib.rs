//! testrollup-report — Report sinks for aggregated test results.
//!
//! Each sink reads the aggregation output by shared reference and writes one
//! representation of it: a CSV table, a static HTML dashboard, or a SQLite
//! database. The JSON summary lives in `testrollup_core::report`.

pub mod csv;
pub mod html;
pub mod sqlite;
