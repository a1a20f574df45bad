//! The `testrollup init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("testrollup.toml"), SAMPLE_CONFIG)?;
    write_if_missing(Path::new("sessions.example.json"), EXAMPLE_SESSIONS)?;

    println!("\nNext steps:");
    println!("  1. Edit testrollup.toml to pick output formats");
    println!("  2. Run: testrollup validate --input sessions.example.json");
    println!("  3. Run: testrollup run --input sessions.example.json");

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# testrollup configuration

output_dir = "out"
formats = ["json", "csv", "html", "sqlite"]
dashboard_title = "testrollup dashboard"
"#;

const EXAMPLE_SESSIONS: &str = r#"[
  {
    "dut": "boardA",
    "session_id": "boardA-001",
    "tests": [
      { "name": "test_boot", "status": "passed", "duration": 1.0 },
      { "name": "test_flash", "status": "failed", "duration": 3.0 }
    ]
  },
  {
    "dut": "boardB",
    "session_id": "boardB-001",
    "tests": [
      { "name": "test_boot", "status": "passed", "duration": 2.0 },
      { "name": "test_radio", "status": "skipped", "duration": 0.0 }
    ]
  }
]
"#;
