//! Summary document with JSON persistence.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::model::{DutSummary, ExtraMetrics, OverallSummary};

/// The JSON summary written to `summary.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryDocument {
    /// Headline totals across all DUTs.
    pub overall: OverallTotals,
    /// Per-DUT breakdown, sorted by DUT name.
    pub per_dut: Vec<DutSummary>,
    pub extra_metrics: ExtraMetrics,
}

/// The overall summary without its per-DUT breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallTotals {
    pub total_tests: usize,
    pub total_passed: usize,
    pub total_failed: usize,
    pub total_skipped: usize,
    pub total_duration: f64,
    pub avg_duration: f64,
    pub overall_pass_rate: f64,
}

impl From<&OverallSummary> for OverallTotals {
    fn from(summary: &OverallSummary) -> Self {
        Self {
            total_tests: summary.total_tests,
            total_passed: summary.total_passed,
            total_failed: summary.total_failed,
            total_skipped: summary.total_skipped,
            total_duration: summary.total_duration,
            avg_duration: summary.avg_duration,
            overall_pass_rate: summary.overall_pass_rate,
        }
    }
}

impl SummaryDocument {
    pub fn new(summary: &OverallSummary, extras: &ExtraMetrics) -> Self {
        Self {
            overall: OverallTotals::from(summary),
            per_dut: summary.per_dut.clone(),
            extra_metrics: extras.clone(),
        }
    }

    /// Failed-test count per DUT, for DUTs with at least one failure.
    pub fn failing_duts(&self) -> BTreeMap<&str, usize> {
        self.per_dut
            .iter()
            .filter(|d| d.failed > 0)
            .map(|d| (d.dut.as_str(), d.failed))
            .collect()
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize summary")
    }

    /// Save the summary as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write summary to {}", path.display()))?;
        info!(path = %path.display(), "wrote JSON summary");
        Ok(())
    }

    /// Load a summary from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read summary from {}", path.display()))?;
        let doc: SummaryDocument =
            serde_json::from_str(&content).context("failed to parse summary JSON")?;
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate_overall;
    use crate::model::{Session, TestRecord, TestStatus};

    fn make_document() -> SummaryDocument {
        let sessions = vec![
            Session {
                dut: "boardA".into(),
                session_id: "s1".into(),
                tests: vec![
                    TestRecord::new("boot", TestStatus::Passed, 1.0),
                    TestRecord::new("flash", TestStatus::Failed, 3.0),
                ],
            },
            Session {
                dut: "boardB".into(),
                session_id: "s2".into(),
                tests: vec![TestRecord::new("boot", TestStatus::Passed, 2.0)],
            },
        ];
        let (overall, extras) = aggregate_overall(&sessions);
        SummaryDocument::new(&overall, &extras)
    }

    #[test]
    fn json_layout_matches_field_names() {
        let doc = make_document();
        let value: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();

        assert_eq!(value["overall"]["total_tests"], 3);
        assert_eq!(value["overall"]["total_failed"], 1);
        assert!(value["overall"].get("per_dut").is_none());
        assert_eq!(value["per_dut"][0]["dut"], "boardA");
        assert_eq!(value["per_dut"][0]["pass_rate"], 50.0);
        assert_eq!(value["extra_metrics"]["tests_per_dut"]["boardB"], 1);
        assert_eq!(value["extra_metrics"]["unique_test_names"], 2);
        assert_eq!(value["extra_metrics"]["slowest_tests"][0]["name"], "flash");
        assert_eq!(value["extra_metrics"]["slowest_tests"][0]["status"], "failed");
        assert_eq!(value["extra_metrics"]["slowest_tests"][0]["session_id"], "s1");
    }

    #[test]
    fn json_roundtrip() {
        let doc = make_document();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("summary.json");

        doc.save_json(&path).unwrap();
        let loaded = SummaryDocument::load_json(&path).unwrap();

        assert_eq!(loaded.overall.total_tests, 3);
        assert!((loaded.overall.overall_pass_rate - doc.overall.overall_pass_rate).abs() < 1e-9);
        assert_eq!(loaded.extra_metrics, doc.extra_metrics);
    }

    #[test]
    fn failing_duts_lists_only_failures() {
        let doc = make_document();
        let failing = doc.failing_duts();
        assert_eq!(failing.len(), 1);
        assert_eq!(failing.get("boardA"), Some(&1));
    }

    #[test]
    fn load_missing_file_fails() {
        let err = SummaryDocument::load_json(Path::new("/nonexistent/summary.json")).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read summary"));
    }
}
