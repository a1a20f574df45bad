//! testrollup configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level testrollup configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollupConfig {
    /// Directory where reports are written.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Report formats written by `run`.
    #[serde(default = "default_formats")]
    pub formats: Vec<String>,
    /// Title shown on the HTML dashboard.
    #[serde(default = "default_dashboard_title")]
    pub dashboard_title: String,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("out")
}
fn default_formats() -> Vec<String> {
    vec!["json".to_string(), "csv".to_string()]
}
fn default_dashboard_title() -> String {
    "testrollup dashboard".to_string()
}

impl Default for RollupConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            formats: default_formats(),
            dashboard_title: default_dashboard_title(),
        }
    }
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. `testrollup.toml` in the current directory
/// 2. `~/.config/testrollup/config.toml`
///
/// Environment variable override: `TESTROLLUP_OUT_DIR`.
pub fn load_config_from(path: Option<&Path>) -> Result<RollupConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("testrollup.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded config");
            config
        }
        None => RollupConfig::default(),
    };

    if let Ok(dir) = std::env::var("TESTROLLUP_OUT_DIR") {
        if !dir.is_empty() {
            config.output_dir = PathBuf::from(dir);
        }
    }

    Ok(config)
}

fn parse_config(content: &str) -> Result<RollupConfig> {
    Ok(toml::from_str::<RollupConfig>(content)?)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("testrollup"))
}
