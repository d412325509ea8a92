// src/config/mod.rs

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

/// Default config file, looked for in the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "sheetdash.yaml";

/// Spreadsheet the dashboard reads; the value baked into every revision of
/// the original.
pub const DEFAULT_SPREADSHEET_ID: &str = "1E2qxc1kZttPQMmSXCVXFaQKVNLl_Nhe4uUPBrzf7B3U";

fn default_spreadsheet_id() -> String {
    DEFAULT_SPREADSHEET_ID.to_string()
}

fn default_contest_worksheet() -> String {
    "Contest Details".to_string()
}

fn default_winner_worksheets() -> Vec<String> {
    crate::fetch::WINNER_SHEET_ALIASES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_credentials_path() -> PathBuf {
    PathBuf::from("google_credentials.json")
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("exports")
}

/// Runtime configuration, loaded from a YAML file when one exists, otherwise
/// entirely defaulted. Secrets never live here; they come from the
/// environment or the credentials file (`auth`).
#[derive(Debug, Clone, Deserialize)]
pub struct DashConfig {
    #[serde(default = "default_spreadsheet_id")]
    pub spreadsheet_id: String,
    #[serde(default = "default_contest_worksheet")]
    pub contest_worksheet: String,
    /// Alias list for the winners worksheet, tried in order.
    #[serde(default = "default_winner_worksheets")]
    pub winner_worksheets: Vec<String>,
    #[serde(default = "default_credentials_path")]
    pub credentials_path: PathBuf,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,
    /// Optional API key for link-shared sheets; env vars take precedence.
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for DashConfig {
    fn default() -> Self {
        DashConfig {
            spreadsheet_id: default_spreadsheet_id(),
            contest_worksheet: default_contest_worksheet(),
            winner_worksheets: default_winner_worksheets(),
            credentials_path: default_credentials_path(),
            cache_ttl_secs: default_cache_ttl_secs(),
            out_dir: default_out_dir(),
            api_key: None,
        }
    }
}

impl DashConfig {
    /// Load from `path` when given, else from `sheetdash.yaml` when present,
    /// else the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let p = PathBuf::from(DEFAULT_CONFIG_PATH);
                if !p.is_file() {
                    debug!("no config file; using defaults");
                    return Ok(DashConfig::default());
                }
                p
            }
        };
        let text = fs::read_to_string(&path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: DashConfig = serde_yaml::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    pub fn winner_aliases(&self) -> Vec<&str> {
        self.winner_worksheets.iter().map(|s| s.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_match_the_source_dashboard() {
        let config = DashConfig::default();
        assert_eq!(config.spreadsheet_id, DEFAULT_SPREADSHEET_ID);
        assert_eq!(config.contest_worksheet, "Contest Details");
        assert_eq!(config.cache_ttl_secs, 300);
        assert_eq!(config.winner_worksheets[0], "Winner Details");
    }

    #[test]
    fn partial_yaml_keeps_the_remaining_defaults() {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(b"spreadsheet_id: other-sheet\ncache_ttl_secs: 60\n")
            .unwrap();
        let config = DashConfig::load(Some(f.path())).unwrap();
        assert_eq!(config.spreadsheet_id, "other-sheet");
        assert_eq!(config.cache_ttl_secs, 60);
        assert_eq!(config.contest_worksheet, "Contest Details");
    }

    #[test]
    fn bad_yaml_is_an_error_with_context() {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(b"cache_ttl_secs: [not a number\n").unwrap();
        let err = DashConfig::load(Some(f.path())).unwrap_err();
        assert!(format!("{:#}", err).contains("parsing config file"));
    }
}
