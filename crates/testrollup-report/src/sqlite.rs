//! SQLite export.
//!
//! Tables:
//! - `sessions`: one row per input session with its own status counts
//! - `tests`: one row per individual test execution
//! - `summary`: a single row (`id = 1`) with the overall statistics

use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use tracing::info;

use testrollup_core::model::{ExtraMetrics, OverallSummary, Session, TestStatus};

/// DDL for the export tables. Safe to run repeatedly.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS sessions (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    dut            TEXT NOT NULL,
    session_id     TEXT NOT NULL,
    total_tests    INTEGER NOT NULL,
    passed         INTEGER NOT NULL,
    failed         INTEGER NOT NULL,
    skipped        INTEGER NOT NULL,
    total_duration REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS tests (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id     TEXT NOT NULL,
    dut            TEXT NOT NULL,
    name           TEXT NOT NULL,
    status         TEXT NOT NULL,
    duration       REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS summary (
    id                INTEGER PRIMARY KEY CHECK (id = 1),
    total_tests       INTEGER NOT NULL,
    total_passed      INTEGER NOT NULL,
    total_failed      INTEGER NOT NULL,
    total_skipped     INTEGER NOT NULL,
    total_duration    REAL NOT NULL,
    avg_duration      REAL NOT NULL,
    overall_pass_rate REAL NOT NULL,
    unique_test_names INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_tests_dut ON tests(dut);
"#;

/// Export sessions and summaries to the database at `path`.
///
/// Rows from a previous export are replaced so the database always mirrors
/// the latest run.
pub fn export_to_sqlite(
    sessions: &[Session],
    summary: &OverallSummary,
    extras: &ExtraMetrics,
    path: &Path,
) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut conn = Connection::open(path)
        .with_context(|| format!("failed to open database {}", path.display()))?;
    export_to_connection(&mut conn, sessions, summary, extras)?;
    info!(
        path = %path.display(),
        sessions = sessions.len(),
        "wrote SQLite export"
    );
    Ok(())
}

/// Export into an already-open connection inside a single transaction.
pub fn export_to_connection(
    conn: &mut Connection,
    sessions: &[Session],
    summary: &OverallSummary,
    extras: &ExtraMetrics,
) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .context("failed to create database schema")?;

    let tx = conn.transaction()?;
    tx.execute("DELETE FROM sessions", [])?;
    tx.execute("DELETE FROM tests", [])?;
    tx.execute("DELETE FROM summary", [])?;

    {
        let mut insert_session = tx.prepare(
            "INSERT INTO sessions (dut, session_id, total_tests, passed, failed, skipped, total_duration)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        let mut insert_test = tx.prepare(
            "INSERT INTO tests (session_id, dut, name, status, duration)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;

        for session in sessions {
            let count = |status: TestStatus| {
                session.tests.iter().filter(|t| t.status() == status).count() as i64
            };
            let total_duration: f64 = session.tests.iter().map(|t| t.duration()).sum();

            insert_session.execute(params![
                session.dut,
                session.session_id,
                session.tests.len() as i64,
                count(TestStatus::Passed),
                count(TestStatus::Failed),
                count(TestStatus::Skipped),
                total_duration,
            ])?;

            for t in &session.tests {
                insert_test.execute(params![
                    session.session_id,
                    session.dut,
                    t.name(),
                    t.status().as_str(),
                    t.duration(),
                ])?;
            }
        }
    }

    tx.execute(
        "INSERT INTO summary (id, total_tests, total_passed, total_failed, total_skipped,
                              total_duration, avg_duration, overall_pass_rate, unique_test_names)
         VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            summary.total_tests as i64,
            summary.total_passed as i64,
            summary.total_failed as i64,
            summary.total_skipped as i64,
            summary.total_duration,
            summary.avg_duration,
            summary.overall_pass_rate,
            extras.unique_test_names as i64,
        ],
    )?;

    tx.commit().context("failed to commit SQLite export")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use testrollup_core::aggregate::aggregate_overall;
    use testrollup_core::model::TestRecord;

    fn make_sessions() -> Vec<Session> {
        vec![
            Session {
                dut: "boardA".into(),
                session_id: "s1".into(),
                tests: vec![
                    TestRecord::new("boot", TestStatus::Passed, 1.0),
                    TestRecord::new("flash", TestStatus::Failed, 3.0),
                    TestRecord::new("radio", TestStatus::classify("blocked"), 0.5),
                ],
            },
            Session {
                dut: "boardB".into(),
                session_id: "s2".into(),
                tests: vec![TestRecord::new("boot", TestStatus::Passed, 2.0)],
            },
        ]
    }

    #[test]
    fn schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        conn.execute_batch(SCHEMA).unwrap();
    }

    #[test]
    fn export_writes_all_tables() {
        let sessions = make_sessions();
        let (summary, extras) = aggregate_overall(&sessions);
        let mut conn = Connection::open_in_memory().unwrap();

        export_to_connection(&mut conn, &sessions, &summary, &extras).unwrap();

        let session_rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM sessions", [], |r| r.get(0))
            .unwrap();
        assert_eq!(session_rows, 2);

        let (passed, failed, skipped): (i64, i64, i64) = conn
            .query_row(
                "SELECT passed, failed, skipped FROM sessions WHERE session_id = 's1'",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .unwrap();
        assert_eq!((passed, failed, skipped), (1, 1, 1));

        let test_rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM tests", [], |r| r.get(0))
            .unwrap();
        assert_eq!(test_rows, 4);

        let radio_status: String = conn
            .query_row("SELECT status FROM tests WHERE name = 'radio'", [], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(radio_status, "skipped");

        let (total, unique): (i64, i64) = conn
            .query_row(
                "SELECT total_tests, unique_test_names FROM summary WHERE id = 1",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!(total, 4);
        assert_eq!(unique, 3);
    }

    #[test]
    fn export_replaces_previous_rows() {
        let sessions = make_sessions();
        let (summary, extras) = aggregate_overall(&sessions);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.db");

        export_to_sqlite(&sessions, &summary, &extras, &path).unwrap();
        export_to_sqlite(&sessions[..1], &summary, &extras, &path).unwrap();

        let conn = Connection::open(&path).unwrap();
        let session_rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM sessions", [], |r| r.get(0))
            .unwrap();
        assert_eq!(session_rows, 1);
        let summary_rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM summary", [], |r| r.get(0))
            .unwrap();
        assert_eq!(summary_rows, 1);
    }
}
