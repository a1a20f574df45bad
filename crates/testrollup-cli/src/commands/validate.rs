//! The `testrollup validate` command.

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::Result;

use testrollup_core::aggregate::aggregate_overall;
use testrollup_core::parser;
use testrollup_core::report::SummaryDocument;

pub fn execute(input: PathBuf) -> Result<()> {
    let ingested = parser::load_sessions(&input)?;

    let duts: BTreeSet<&str> = ingested.sessions.iter().map(|s| s.dut.as_str()).collect();
    println!(
        "Input: {} ({} sessions, {} tests, {} DUTs)",
        input.display(),
        ingested.sessions.len(),
        ingested.test_count(),
        duts.len()
    );

    for w in &ingested.warnings {
        println!("  WARNING: {w}");
    }

    if ingested.warnings.is_empty() {
        println!("Input valid.");
    } else {
        println!("\n{} warning(s) found.", ingested.warnings.len());
    }

    let (summary, extras) = aggregate_overall(&ingested.sessions);
    let doc = SummaryDocument::new(&summary, &extras);
    for (dut, failed) in doc.failing_duts() {
        println!("  {dut}: {failed} failed test(s)");
    }

    Ok(())
}
