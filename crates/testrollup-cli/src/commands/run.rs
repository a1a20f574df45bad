//! The `testrollup run` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use testrollup_core::aggregate::aggregate_overall;
use testrollup_core::model::{ExtraMetrics, OverallSummary};
use testrollup_core::parser;
use testrollup_core::report::SummaryDocument;
use testrollup_report::csv::write_per_dut_csv;
use testrollup_report::html::write_html_report;
use testrollup_report::sqlite::export_to_sqlite;

use crate::config::load_config_from;

/// A report sink selectable with `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Csv,
    Html,
    Sqlite,
}

impl Format {
    const ALL: [Format; 4] = [Format::Json, Format::Csv, Format::Html, Format::Sqlite];

    fn file_name(self) -> &'static str {
        match self {
            Format::Json => "summary.json",
            Format::Csv => "per_dut_summary.csv",
            Format::Html => "dashboard.html",
            Format::Sqlite => "results.db",
        }
    }
}

/// Parse format names, expanding `all` and dropping duplicates.
pub fn parse_formats<S: AsRef<str>>(names: &[S]) -> Result<Vec<Format>> {
    let mut formats = Vec::new();
    for name in names {
        let name = name.as_ref().trim();
        let parsed: &[Format] = match name.to_lowercase().as_str() {
            "json" => &[Format::Json],
            "csv" => &[Format::Csv],
            "html" => &[Format::Html],
            "sqlite" | "db" => &[Format::Sqlite],
            "all" => &Format::ALL,
            "" => &[],
            other => anyhow::bail!(
                "unknown format '{other}' (expected json, csv, html, sqlite, or all)"
            ),
        };
        for f in parsed {
            if !formats.contains(f) {
                formats.push(*f);
            }
        }
    }
    anyhow::ensure!(!formats.is_empty(), "at least one output format is required");
    Ok(formats)
}

pub fn execute(
    input: PathBuf,
    out_dir: Option<PathBuf>,
    format: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let formats = match &format {
        Some(f) => parse_formats(&f.split(',').collect::<Vec<_>>())?,
        None => parse_formats(&config.formats)?,
    };
    let out_dir = out_dir.unwrap_or_else(|| config.output_dir.clone());

    if !input.exists() {
        eprintln!("Error: input file not found: {}", input.display());
        std::process::exit(2);
    }

    let ingested = parser::load_sessions(&input)?;
    info!(
        input = %input.display(),
        sessions = ingested.sessions.len(),
        warnings = ingested.warnings.len(),
        "ingested input"
    );

    let (summary, extras) = aggregate_overall(&ingested.sessions);

    print_summary(&summary, &extras);

    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create output directory {}", out_dir.display()))?;

    for fmt in &formats {
        let path = out_dir.join(fmt.file_name());
        match fmt {
            Format::Json => SummaryDocument::new(&summary, &extras).save_json(&path)?,
            Format::Csv => write_per_dut_csv(&summary.per_dut, &path)?,
            Format::Html => {
                write_html_report(&summary, &extras, &config.dashboard_title, &path)?
            }
            Format::Sqlite => export_to_sqlite(&ingested.sessions, &summary, &extras, &path)?,
        }
    }

    let resolved = std::fs::canonicalize(&out_dir).unwrap_or(out_dir);
    println!("Reports generated in: {}", resolved.display());

    Ok(())
}

fn print_summary(summary: &OverallSummary, extras: &ExtraMetrics) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec![
        "DUT", "Total", "Passed", "Failed", "Skipped", "Duration", "Avg", "Pass %",
    ]);

    for d in &summary.per_dut {
        table.add_row(vec![
            Cell::new(&d.dut),
            Cell::new(d.total),
            Cell::new(d.passed),
            Cell::new(d.failed),
            Cell::new(d.skipped),
            Cell::new(format!("{:.3}s", d.total_duration)),
            Cell::new(format!("{:.3}s", d.avg_duration)),
            Cell::new(format!("{:.2}%", d.pass_rate)),
        ]);
    }
    table.add_row(vec![
        Cell::new("ALL"),
        Cell::new(summary.total_tests),
        Cell::new(summary.total_passed),
        Cell::new(summary.total_failed),
        Cell::new(summary.total_skipped),
        Cell::new(format!("{:.3}s", summary.total_duration)),
        Cell::new(format!("{:.3}s", summary.avg_duration)),
        Cell::new(format!("{:.2}%", summary.overall_pass_rate)),
    ]);

    eprintln!("\n{table}");
    eprintln!("Unique test names: {}", extras.unique_test_names);

    if !extras.slowest_tests.is_empty() {
        eprintln!("Slowest tests:");
        for t in &extras.slowest_tests {
            eprintln!(
                "  {:.3}s  {} [{}] ({}, session '{}')",
                t.duration, t.name, t.status, t.dut, t.session_id
            );
        }
    }
}
