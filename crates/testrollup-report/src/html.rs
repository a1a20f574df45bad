//! HTML dashboard generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::info;

use testrollup_core::model::{DutSummary, ExtraMetrics, OverallSummary};
use testrollup_core::report::SummaryDocument;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn rate_class(rate: f64) -> &'static str {
    if rate >= 90.0 {
        "pass"
    } else if rate >= 50.0 {
        "warn"
    } else {
        "fail"
    }
}

/// Generate the dashboard page.
pub fn generate_html(
    summary: &OverallSummary,
    extras: &ExtraMetrics,
    title: &str,
    generated_at: DateTime<Utc>,
) -> Result<String> {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!("<title>{}</title>\n", html_escape(title)));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str(&format!("<h1>{}</h1>\n", html_escape(title)));
    html.push_str(&format!(
        "<p class=\"meta\">{} DUTs | {} tests | {} unique names | generated {}</p>\n",
        summary.per_dut.len(),
        summary.total_tests,
        extras.unique_test_names,
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Headline cards
    html.push_str("<section class=\"cards\">\n");
    let cards = [
        ("Total", summary.total_tests.to_string(), ""),
        ("Passed", summary.total_passed.to_string(), "pass"),
        ("Failed", summary.total_failed.to_string(), "fail"),
        ("Skipped", summary.total_skipped.to_string(), "skip"),
        (
            "Pass rate",
            format!("{:.2}%", summary.overall_pass_rate),
            rate_class(summary.overall_pass_rate),
        ),
        (
            "Duration",
            format!("{:.3}s (avg {:.3}s)", summary.total_duration, summary.avg_duration),
            "",
        ),
    ];
    for (label, value, class) in &cards {
        html.push_str(&format!(
            "<div class=\"card {class}\"><div class=\"label\">{label}</div><div class=\"value\">{value}</div></div>\n"
        ));
    }
    html.push_str("</section>\n");

    // Per-DUT table
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Per DUT</h2>\n");
    html.push_str("<table class=\"results-table\" id=\"per-dut\">\n");
    html.push_str("<thead><tr>");
    for (i, col) in [
        "DUT", "Total", "Passed", "Failed", "Skipped", "Duration (s)", "Avg (s)", "Pass rate",
    ]
    .iter()
    .enumerate()
    {
        html.push_str(&format!("<th onclick=\"sortTable({i})\">{col}</th>"));
    }
    html.push_str("</tr></thead>\n<tbody>\n");
    for d in &summary.per_dut {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{:.3}</td><td>{:.3}</td><td class=\"{}\">{:.2}%</td></tr>\n",
            html_escape(&d.dut),
            d.total,
            d.passed,
            d.failed,
            d.skipped,
            d.total_duration,
            d.avg_duration,
            rate_class(d.pass_rate),
            d.pass_rate,
        ));
    }
    html.push_str("</tbody></table>\n");

    if !summary.per_dut.is_empty() {
        html.push_str(&generate_bar_chart(&summary.per_dut));
    }
    html.push_str("</section>\n");

    // Slowest tests
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Slowest tests</h2>\n");
    if extras.slowest_tests.is_empty() {
        html.push_str("<p class=\"meta\">No tests recorded.</p>\n");
    } else {
        html.push_str("<table class=\"results-table\">\n");
        html.push_str("<thead><tr><th>Test</th><th>DUT</th><th>Session</th><th>Duration (s)</th><th>Status</th></tr></thead>\n");
        html.push_str("<tbody>\n");
        for t in &extras.slowest_tests {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{:.3}</td><td class=\"{}\">{}</td></tr>\n",
                html_escape(&t.name),
                html_escape(&t.dut),
                html_escape(&t.session_id),
                t.duration,
                status_class(t.status.as_str()),
                t.status,
            ));
        }
        html.push_str("</tbody></table>\n");
    }
    html.push_str("</section>\n");

    // Raw JSON
    let doc = SummaryDocument::new(summary, extras);
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    let raw = doc.to_json().context("failed to serialize dashboard data")?;
    html.push_str(&html_escape(&raw));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    // JavaScript for sorting
    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    Ok(html)
}

fn status_class(status: &str) -> &'static str {
    match status {
        "passed" => "pass",
        "failed" => "fail",
        _ => "skip",
    }
}

/// Write the dashboard to a file, stamped with the current time.
pub fn write_html_report(
    summary: &OverallSummary,
    extras: &ExtraMetrics,
    title: &str,
    path: &Path,
) -> Result<()> {
    let html = generate_html(summary, extras, title, Utc::now())?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write dashboard to {}", path.display()))?;
    info!(path = %path.display(), "wrote HTML dashboard");
    Ok(())
}

fn generate_bar_chart(per_dut: &[DutSummary]) -> String {
    let bar_height = 30;
    let max_width = 400;
    let padding = 10;
    let label_width = 200;

    let total_height = per_dut.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 80,
        total_height
    );

    for (i, d) in per_dut.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let width = (d.pass_rate / 100.0 * max_width as f64) as usize;

        let color = if d.pass_rate >= 90.0 {
            "#22c55e"
        } else if d.pass_rate >= 50.0 {
            "#eab308"
        } else {
            "#ef4444"
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(&d.dut)
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{:.1}%</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            d.pass_rate
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --warn: #fef9c3; --fail: #fde2e2; --skip: #f3f4f6; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --warn: #713f12; --fail: #7f1d1d; --skip: #1f2937; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
.cards { display: flex; flex-wrap: wrap; gap: 1rem; }
.card { border: 1px solid var(--border); border-radius: 8px; padding: 1rem 1.5rem; min-width: 8rem; }
.card .label { font-size: 0.8rem; color: #6b7280; text-transform: uppercase; }
.card .value { font-size: 1.5rem; font-weight: bold; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); cursor: pointer; }
.pass { background: var(--pass); }
.warn { background: var(--warn); }
.fail { background: var(--fail); }
.skip { background: var(--skip); }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('per-dut');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    const na = parseFloat(va), nb = parseFloat(vb);
    const cmp = col > 0 && !isNaN(na) && !isNaN(nb) ? na - nb : va.localeCompare(vb);
    return asc ? cmp : -cmp;
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;
