//! Per-DUT CSV table.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use testrollup_core::model::DutSummary;

/// Column order of the per-DUT table.
pub const PER_DUT_HEADER: [&str; 8] = [
    "dut",
    "total",
    "passed",
    "failed",
    "skipped",
    "total_duration",
    "avg_duration",
    "pass_rate",
];

fn row(d: &DutSummary) -> [String; 8] {
    [
        d.dut.clone(),
        d.total.to_string(),
        d.passed.to_string(),
        d.failed.to_string(),
        d.skipped.to_string(),
        format!("{:.3}", d.total_duration),
        format!("{:.3}", d.avg_duration),
        format!("{:.2}", d.pass_rate),
    ]
}

/// Write the per-DUT table to any writer.
pub fn write_per_dut_csv_to<W: Write>(per_dut: &[DutSummary], writer: W) -> Result<()> {
    let mut wtr = ::csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    wtr.write_record(PER_DUT_HEADER)
        .context("failed to write CSV header")?;
    for d in per_dut {
        wtr.write_record(row(d))
            .with_context(|| format!("failed to write CSV row for {}", d.dut))?;
    }
    wtr.flush().context("failed to flush CSV output")?;
    Ok(())
}

/// Render the per-DUT table as a string.
pub fn generate_per_dut_csv(per_dut: &[DutSummary]) -> Result<String> {
    let mut buf = Vec::new();
    write_per_dut_csv_to(per_dut, &mut buf)?;
    String::from_utf8(buf).context("CSV output is not valid UTF-8")
}

/// Write the per-DUT table to a file.
pub fn write_per_dut_csv(per_dut: &[DutSummary], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_per_dut_csv_to(per_dut, file)?;
    info!(path = %path.display(), rows = per_dut.len(), "wrote per-DUT CSV");
    Ok(())
}
