use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

use crate::paths::config_path;

/// Log output formatter selected with `--log-format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    /// An empty value means `text`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}' (expected text or json)", other)),
        }
    }
}

/// Invocation settings, built once from the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub verbose: bool,
    pub log_format: Option<LogFormat>,
    pub github_user: Option<String>,
    pub repo_name: Option<String>,
}

impl Config {
    /// Debug logging is on with `--verbose` or whenever `--log-format` is given.
    pub fn debug_logging(&self) -> bool {
        self.verbose || self.log_format.is_some()
    }
}

/// Transport used in the `origin` URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Ssh,
    Https,
}

/// Optional defaults loaded from `config.toml`.
///
/// Example TOML:
/// ```toml
/// [github]
/// user = "alice"
/// host = "github.com"
/// protocol = "ssh"
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub github: GithubDefaults,
}

#[derive(Debug, Deserialize)]
pub struct GithubDefaults {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default)]
    pub protocol: Protocol,
}

impl Default for GithubDefaults {
    fn default() -> Self {
        Self {
            user: None,
            host: default_host(),
            protocol: Protocol::default(),
        }
    }
}

fn default_host() -> String {
    "github.com".to_string()
}

/// Load the defaults file from its standard location.
///
/// A missing file, or no `XDG_CONFIG_HOME`/`HOME` to look under, yields the
/// built-in defaults.
pub fn load_file_config() -> Result<FileConfig> {
    let path = match config_path() {
        Ok(path) => path,
        Err(e) => {
            debug!(error = %e, "no config location, using defaults");
            return Ok(FileConfig::default());
        }
    };
    load_file_config_from(&path)
}

/// Load and parse the defaults file at `path`.
///
/// # Errors
/// - Returns an error if the file exists but cannot be read.
/// - Returns an error if parsing the TOML fails; the path is included in the message.
pub fn load_file_config_from(path: &Path) -> Result<FileConfig> {
    let txt = match fs::read_to_string(path) {
        Ok(txt) => txt,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(FileConfig::default()),
        Err(e) => {
            return Err(e).with_context(|| format!("failed to read {}", path.display()));
        }
    };
    toml::from_str(&txt).with_context(|| format!("failed to parse {}", path.display()))
}
