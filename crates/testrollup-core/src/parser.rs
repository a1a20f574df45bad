//! JSON session parser.
//!
//! Decodes a JSON array of session objects into [`Session`] values. Decoding
//! is best-effort: missing or malformed fields fall back to defaults and are
//! reported as warnings rather than failing the whole input.

use std::fmt;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::IngestError;
use crate::model::{Session, TestRecord, TestStatus, UNKNOWN_NAME};

/// A recoverable problem found while decoding the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestWarning {
    /// Position of the session in the input array.
    pub session_index: usize,
    /// Position of the test within the session, if the problem is test-level.
    pub test_index: Option<usize>,
    pub message: String,
}

impl fmt::Display for IngestWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.test_index {
            Some(t) => write!(
                f,
                "session #{}, test #{}: {}",
                self.session_index, t, self.message
            ),
            None => write!(f, "session #{}: {}", self.session_index, self.message),
        }
    }
}

/// Decoded sessions plus everything that had to be coerced along the way.
#[derive(Debug, Clone, Default)]
pub struct Ingested {
    /// Sessions in source order.
    pub sessions: Vec<Session>,
    pub warnings: Vec<IngestWarning>,
}

impl Ingested {
    pub fn test_count(&self) -> usize {
        self.sessions.iter().map(|s| s.tests.len()).sum()
    }
}

/// Load sessions from a JSON file.
pub fn load_sessions(path: &Path) -> Result<Ingested, IngestError> {
    let content = std::fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let ingested = parse_sessions_str(&content)?;
    debug!(
        path = %path.display(),
        sessions = ingested.sessions.len(),
        warnings = ingested.warnings.len(),
        "loaded sessions"
    );
    Ok(ingested)
}

/// Parse a JSON string into sessions (useful for testing).
pub fn parse_sessions_str(content: &str) -> Result<Ingested, IngestError> {
    let raw: Value = serde_json::from_str(content)?;
    let items = match raw {
        Value::Array(items) => items,
        other => {
            return Err(IngestError::NotAnArray {
                found: kind(&other),
            })
        }
    };

    let mut ingested = Ingested::default();
    for (index, item) in items.iter().enumerate() {
        let mut decoder = Decoder {
            session_index: index,
            warnings: &mut ingested.warnings,
        };
        if let Some(session) = decoder.session(item) {
            ingested.sessions.push(session);
        }
    }
    Ok(ingested)
}

struct Decoder<'a> {
    session_index: usize,
    warnings: &'a mut Vec<IngestWarning>,
}

impl Decoder<'_> {
    fn warn(&mut self, test_index: Option<usize>, message: String) {
        warn!(session = self.session_index, test = ?test_index, "{message}");
        self.warnings.push(IngestWarning {
            session_index: self.session_index,
            test_index,
            message,
        });
    }

    fn session(&mut self, item: &Value) -> Option<Session> {
        let Some(obj) = item.as_object() else {
            self.warn(None, format!("expected an object, found {}; skipped", kind(item)));
            return None;
        };

        let dut = match obj.get("dut") {
            None | Some(Value::Null) => {
                self.warn(None, format!("missing \"dut\", using \"{UNKNOWN_NAME}\""));
                UNKNOWN_NAME.to_string()
            }
            Some(value) => match scalar_text(value) {
                Some(dut) => dut,
                None => {
                    self.warn(
                        None,
                        format!(
                            "\"dut\" should be a string, found {}; using \"{UNKNOWN_NAME}\"",
                            kind(value)
                        ),
                    );
                    UNKNOWN_NAME.to_string()
                }
            },
        };
        let session_id = obj.get("session_id").and_then(scalar_text).unwrap_or_default();

        let tests = match obj.get("tests") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .filter_map(|(i, t)| self.test(i, t))
                .collect(),
            Some(other) => {
                self.warn(
                    None,
                    format!("\"tests\" should be an array, found {}; treated as empty", kind(other)),
                );
                Vec::new()
            }
        };

        Some(Session {
            dut,
            session_id,
            tests,
        })
    }

    fn test(&mut self, index: usize, item: &Value) -> Option<TestRecord> {
        let Some(obj) = item.as_object() else {
            self.warn(
                Some(index),
                format!("expected an object, found {}; skipped", kind(item)),
            );
            return None;
        };

        let name = match obj.get("name") {
            None | Some(Value::Null) => None,
            Some(value) => match scalar_text(value) {
                Some(name) => Some(name),
                None => {
                    self.warn(
                        Some(index),
                        format!(
                            "\"name\" should be a string, found {}; using \"{UNKNOWN_NAME}\"",
                            kind(value)
                        ),
                    );
                    Some(UNKNOWN_NAME.to_string())
                }
            },
        };
        let name = match name {
            Some(name) if !name.is_empty() => name,
            _ => {
                self.warn(Some(index), format!("missing \"name\", using \"{UNKNOWN_NAME}\""));
                UNKNOWN_NAME.to_string()
            }
        };

        let status = match obj.get("status") {
            None | Some(Value::Null) => TestStatus::Skipped,
            Some(Value::String(raw)) => {
                let status = TestStatus::classify(raw);
                if status == TestStatus::Skipped && !raw.eq_ignore_ascii_case("skipped") {
                    self.warn(
                        Some(index),
                        format!("unrecognized status \"{raw}\" counted as skipped"),
                    );
                }
                status
            }
            Some(other) => {
                self.warn(
                    Some(index),
                    format!("status should be a string, found {}; counted as skipped", kind(other)),
                );
                TestStatus::Skipped
            }
        };

        let duration = match obj.get("duration") {
            None | Some(Value::Null) => 0.0,
            Some(value) => match number(value) {
                Some(d) if d.is_finite() && d >= 0.0 => d,
                Some(d) => {
                    self.warn(Some(index), format!("invalid duration {d}, using 0.0"));
                    0.0
                }
                None => {
                    self.warn(
                        Some(index),
                        format!("unparseable duration {value}, using 0.0"),
                    );
                    0.0
                }
            },
        };

        Some(TestRecord::new(name, status, duration))
    }
}

/// Read a scalar as text; numbers and booleans are stringified.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_well_formed_input() {
        let input = r#"[
            {"dut": "boardA", "session_id": "s1", "tests": [
                {"name": "boot", "status": "passed", "duration": 1.5},
                {"name": "flash", "status": "FAILED", "duration": 3}
            ]},
            {"dut": "boardB", "session_id": "s2", "tests": []}
        ]"#;
        let ingested = parse_sessions_str(input).unwrap();
        assert!(ingested.warnings.is_empty());
        assert_eq!(ingested.sessions.len(), 2);
        assert_eq!(ingested.test_count(), 2);

        let first = &ingested.sessions[0];
        assert_eq!(first.dut, "boardA");
        assert_eq!(first.session_id, "s1");
        assert_eq!(first.tests[0].status(), TestStatus::Passed);
        assert_eq!(first.tests[1].status(), TestStatus::Failed);
        assert_eq!(first.tests[1].duration(), 3.0);
        assert!(ingested.sessions[1].tests.is_empty());
    }

    #[test]
    fn missing_fields_use_defaults() {
        let input = r#"[{"tests": [{}]}]"#;
        let ingested = parse_sessions_str(input).unwrap();
        let session = &ingested.sessions[0];
        assert_eq!(session.dut, UNKNOWN_NAME);
        assert_eq!(session.session_id, "");
        let test = &session.tests[0];
        assert_eq!(test.name(), UNKNOWN_NAME);
        assert_eq!(test.status(), TestStatus::Skipped);
        assert_eq!(test.duration(), 0.0);
        // dut + name
        assert_eq!(ingested.warnings.len(), 2);
    }

    #[test]
    fn malformed_duration_falls_back_to_zero() {
        let input = r#"[{"dut": "d", "tests": [
            {"name": "a", "status": "passed", "duration": "2.5"},
            {"name": "b", "status": "passed", "duration": "slow"},
            {"name": "c", "status": "passed", "duration": -4},
            {"name": "d", "status": "passed", "duration": [1]}
        ]}]"#;
        let ingested = parse_sessions_str(input).unwrap();
        let durations: Vec<f64> = ingested.sessions[0]
            .tests
            .iter()
            .map(|t| t.duration())
            .collect();
        assert_eq!(durations, [2.5, 0.0, 0.0, 0.0]);
        assert_eq!(ingested.warnings.len(), 3);
        assert!(ingested
            .warnings
            .iter()
            .all(|w| w.session_index == 0 && w.test_index.is_some()));
    }

    #[test]
    fn unrecognized_status_warns_and_skips() {
        let input = r#"[{"dut": "d", "tests": [
            {"name": "a", "status": "blocked"},
            {"name": "b", "status": "Skipped"},
            {"name": "c", "status": 1}
        ]}]"#;
        let ingested = parse_sessions_str(input).unwrap();
        assert!(ingested.sessions[0]
            .tests
            .iter()
            .all(|t| t.status() == TestStatus::Skipped));
        assert_eq!(ingested.warnings.len(), 2);
        assert_eq!(
            ingested.warnings[0].to_string(),
            "session #0, test #0: unrecognized status \"blocked\" counted as skipped"
        );
    }

    #[test]
    fn non_object_elements_are_skipped() {
        let input = r#"[42, {"dut": "d", "tests": ["oops", {"name": "ok"}]}]"#;
        let ingested = parse_sessions_str(input).unwrap();
        assert_eq!(ingested.sessions.len(), 1);
        assert_eq!(ingested.sessions[0].tests.len(), 1);
        assert_eq!(ingested.warnings.len(), 2);
        assert_eq!(ingested.warnings[0].session_index, 0);
        assert_eq!(ingested.warnings[1].session_index, 1);
    }

    #[test]
    fn non_array_tests_treated_as_empty() {
        let input = r#"[{"dut": "d", "tests": {"name": "x"}}]"#;
        let ingested = parse_sessions_str(input).unwrap();
        assert!(ingested.sessions[0].tests.is_empty());
        assert_eq!(ingested.warnings.len(), 1);
    }

    #[test]
    fn numeric_identifiers_are_stringified() {
        let input = r#"[{"dut": 7, "session_id": 1001, "tests": [{"name": 3, "status": "passed"}]}]"#;
        let ingested = parse_sessions_str(input).unwrap();
        let session = &ingested.sessions[0];
        assert_eq!(session.dut, "7");
        assert_eq!(session.session_id, "1001");
        assert_eq!(session.tests[0].name(), "3");
    }

    #[test]
    fn non_scalar_identifiers_report_their_type() {
        let input = r#"[{"dut": {"id": 1}, "session_id": [1], "tests": [
            {"name": ["x"], "status": "passed"}
        ]}]"#;
        let ingested = parse_sessions_str(input).unwrap();
        let session = &ingested.sessions[0];
        assert_eq!(session.dut, UNKNOWN_NAME);
        assert_eq!(session.session_id, "");
        assert_eq!(session.tests[0].name(), UNKNOWN_NAME);

        let messages: Vec<String> = ingested.warnings.iter().map(|w| w.to_string()).collect();
        assert_eq!(
            messages,
            [
                "session #0: \"dut\" should be a string, found object; using \"unknown\"",
                "session #0, test #0: \"name\" should be a string, found array; using \"unknown\"",
            ]
        );
    }

    #[test]
    fn top_level_must_be_array() {
        let err = parse_sessions_str(r#"{"dut": "d"}"#).unwrap_err();
        assert!(matches!(err, IngestError::NotAnArray { found: "object" }));
    }

    #[test]
    fn invalid_json_is_an_error() {
        let err = parse_sessions_str("[{").unwrap_err();
        assert!(matches!(err, IngestError::Json(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.json");
        std::fs::write(&path, r#"[{"dut": "d", "session_id": "s", "tests": []}]"#).unwrap();

        let ingested = load_sessions(&path).unwrap();
        assert_eq!(ingested.sessions.len(), 1);
    }

    #[test]
    fn load_missing_file() {
        let err = load_sessions(Path::new("/nonexistent/sessions.json")).unwrap_err();
        assert!(matches!(err, IngestError::Io { .. }));
        assert!(err.to_string().contains("failed to read input file"));
    }
}
