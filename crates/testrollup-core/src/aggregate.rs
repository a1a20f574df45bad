//! Per-DUT and overall aggregation of test sessions.
//!
//! Every function here is pure: the output is freshly built from the input
//! sessions on each call.

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::model::{DutSummary, ExtraMetrics, OverallSummary, Session, SlowTest, TestStatus};

/// Number of entries in the slowest-tests list.
pub const SLOWEST_TESTS_LIMIT: usize = 5;

/// Running totals for one DUT.
#[derive(Debug, Default)]
struct DutAccumulator {
    total: usize,
    passed: usize,
    failed: usize,
    skipped: usize,
    duration: f64,
}

impl DutAccumulator {
    fn finish(self, dut: String) -> DutSummary {
        DutSummary {
            dut,
            total: self.total,
            passed: self.passed,
            failed: self.failed,
            skipped: self.skipped,
            total_duration: self.duration,
            avg_duration: ratio(self.duration, self.total),
            pass_rate: percentage(self.passed, self.total),
        }
    }
}

fn ratio(sum: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

/// Aggregate results per DUT.
///
/// Returns one summary per distinct DUT, sorted by DUT name. A DUT whose
/// sessions contain no tests still gets an all-zero row.
pub fn aggregate_per_dut(sessions: &[Session]) -> Vec<DutSummary> {
    let mut per_dut: BTreeMap<&str, DutAccumulator> = BTreeMap::new();

    for session in sessions {
        let acc = per_dut.entry(session.dut.as_str()).or_default();
        for test in &session.tests {
            acc.total += 1;
            acc.duration += test.duration();
            match test.status() {
                TestStatus::Passed => acc.passed += 1,
                TestStatus::Failed => acc.failed += 1,
                TestStatus::Skipped => acc.skipped += 1,
            }
        }
    }

    debug!(
        sessions = sessions.len(),
        duts = per_dut.len(),
        "aggregated sessions per DUT"
    );

    per_dut
        .into_iter()
        .map(|(dut, acc)| acc.finish(dut.to_string()))
        .collect()
}

/// The `limit` slowest tests across all sessions, longest first.
///
/// Ties keep session order, then in-session test order.
pub fn slowest_tests(sessions: &[Session], limit: usize) -> Vec<SlowTest> {
    let mut all: Vec<SlowTest> = sessions
        .iter()
        .flat_map(|session| {
            session.tests.iter().map(move |test| SlowTest {
                name: test.name().to_string(),
                dut: session.dut.clone(),
                session_id: session.session_id.clone(),
                duration: test.duration(),
                status: test.status(),
            })
        })
        .collect();

    // `sort_by` is stable, which is what keeps ties in input order.
    all.sort_by(|a, b| b.duration.total_cmp(&a.duration));
    all.truncate(limit);
    all
}

/// Count of distinct test names across every session.
pub fn unique_test_names(sessions: &[Session]) -> usize {
    sessions
        .iter()
        .flat_map(|s| s.tests.iter().map(|t| t.name()))
        .collect::<HashSet<_>>()
        .len()
}

/// Aggregate results across all DUTs and compute extra metrics.
///
/// The overall totals are summed from the per-DUT summaries so they always
/// agree with the breakdown exactly.
pub fn aggregate_overall(sessions: &[Session]) -> (OverallSummary, ExtraMetrics) {
    let per_dut = aggregate_per_dut(sessions);

    let total_tests: usize = per_dut.iter().map(|d| d.total).sum();
    let total_passed: usize = per_dut.iter().map(|d| d.passed).sum();
    let total_failed: usize = per_dut.iter().map(|d| d.failed).sum();
    let total_skipped: usize = per_dut.iter().map(|d| d.skipped).sum();
    let total_duration: f64 = per_dut.iter().map(|d| d.total_duration).sum();

    let extras = ExtraMetrics {
        slowest_tests: slowest_tests(sessions, SLOWEST_TESTS_LIMIT),
        tests_per_dut: per_dut.iter().map(|d| (d.dut.clone(), d.total)).collect(),
        unique_test_names: unique_test_names(sessions),
    };

    let overall = OverallSummary {
        total_tests,
        total_passed,
        total_failed,
        total_skipped,
        total_duration,
        avg_duration: ratio(total_duration, total_tests),
        overall_pass_rate: percentage(total_passed, total_tests),
        per_dut,
    };

    debug!(
        total_tests,
        unique_test_names = extras.unique_test_names,
        "aggregated overall summary"
    );

    (overall, extras)
}
