//! Core data model types for testrollup.
//!
//! These are the record shapes that flow from ingestion through the
//! aggregation engine and into every report sink.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Name substituted for a test or DUT that has none.
pub const UNKNOWN_NAME: &str = "unknown";

/// Outcome of a single test.
///
/// Classification is lossy: anything that is not `passed` or `failed`
/// (case-insensitive) is treated as skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
    Skipped,
}

impl TestStatus {
    /// Classify a raw status string.
    pub fn classify(raw: &str) -> Self {
        match raw.to_lowercase().as_str() {
            "passed" => TestStatus::Passed,
            "failed" => TestStatus::Failed,
            _ => TestStatus::Skipped,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TestStatus::Passed => "passed",
            TestStatus::Failed => "failed",
            TestStatus::Skipped => "skipped",
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The result of a single test case.
///
/// Only constructible through [`TestRecord::new`], which also backs
/// deserialization, so the name is never empty and the duration is never
/// negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawTestRecord")]
pub struct TestRecord {
    name: String,
    status: TestStatus,
    duration: f64,
}

/// Wire shape of a [`TestRecord`] before coercion.
#[derive(Deserialize)]
struct RawTestRecord {
    #[serde(default)]
    name: String,
    #[serde(default = "default_status")]
    status: TestStatus,
    #[serde(default)]
    duration: f64,
}

fn default_status() -> TestStatus {
    TestStatus::Skipped
}

impl From<RawTestRecord> for TestRecord {
    fn from(raw: RawTestRecord) -> Self {
        TestRecord::new(raw.name, raw.status, raw.duration)
    }
}

impl TestRecord {
    /// Build a record, coercing the duration to a finite non-negative value.
    pub fn new(name: impl Into<String>, status: TestStatus, duration: f64) -> Self {
        let name = name.into();
        Self {
            name: if name.is_empty() {
                UNKNOWN_NAME.to_string()
            } else {
                name
            },
            status,
            duration: sanitize_duration(duration),
        }
    }

    /// Test name, never empty.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Normalized outcome.
    pub fn status(&self) -> TestStatus {
        self.status
    }

    /// Execution time in seconds, never negative.
    pub fn duration(&self) -> f64 {
        self.duration
    }
}

/// Clamp a duration into the non-negative finite range, with 0.0 for garbage.
pub fn sanitize_duration(duration: f64) -> f64 {
    if duration.is_finite() && duration > 0.0 {
        duration
    } else {
        0.0
    }
}

/// One test session run against a single DUT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Device/configuration under test.
    pub dut: String,
    /// Session identifier, may be empty.
    #[serde(default)]
    pub session_id: String,
    /// Tests in execution order.
    #[serde(default)]
    pub tests: Vec<TestRecord>,
}

/// Aggregated statistics for a single DUT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DutSummary {
    pub dut: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Sum of test durations in seconds.
    pub total_duration: f64,
    /// `total_duration / total`, 0.0 when there are no tests.
    pub avg_duration: f64,
    /// Percentage of passed tests, 0–100.
    pub pass_rate: f64,
}

/// Aggregated statistics across all DUTs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallSummary {
    pub total_tests: usize,
    pub total_passed: usize,
    pub total_failed: usize,
    pub total_skipped: usize,
    pub total_duration: f64,
    pub avg_duration: f64,
    /// Percentage of passed tests, 0–100.
    pub overall_pass_rate: f64,
    /// Per-DUT breakdown, sorted by DUT name.
    pub per_dut: Vec<DutSummary>,
}

/// An entry in the slowest-tests list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlowTest {
    pub name: String,
    pub dut: String,
    pub session_id: String,
    pub duration: f64,
    pub status: TestStatus,
}

/// Derived analytics beyond the per-DUT and overall totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraMetrics {
    /// Slowest tests across all sessions, longest first.
    pub slowest_tests: Vec<SlowTest>,
    /// Number of tests per DUT.
    pub tests_per_dut: BTreeMap<String, usize>,
    /// Count of distinct test names (case-sensitive).
    pub unique_test_names: usize,
}
