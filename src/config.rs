use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Run configuration. Everything the core touches on disk goes through
/// here, so tests can point the whole pipeline at temp paths.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Listing page to scrape.
    pub url: String,
    /// Directory of dated HTML snapshots.
    pub source_dir: PathBuf,
    /// Spreadsheet master file.
    pub xlsx_store: PathBuf,
    /// Markdown table file.
    pub text_store: PathBuf,
    /// Last-seen content token.
    pub fingerprint_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            url: "https://davjehanabad.in".into(),
            source_dir: "BD".into(),
            xlsx_store: "Birthday Data Master.xlsx".into(),
            text_store: PathBuf::from("html").join("Birthday Data Master.md"),
            fingerprint_file: "last_hash.txt".into(),
        }
    }
}

impl Config {
    /// Defaults, optionally overridden by a TOML file.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let Some(path) = path else {
            return Ok(Config::default());
        };
        let raw = std::fs::read_to_string(path)
            .context(format!("Failed to read config {}", path.display()))?;
        toml::from_str(&raw).context(format!("Invalid config {}", path.display()))
    }
}

// ── Tests ──
