use anyhow::{Context, Result};
use graph::{LayoutEngine, OutputFormat};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

#[cfg(windows)]
pub fn config_dir() -> PathBuf {
    std::env::var("APPDATA")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("smaliscan")
}

#[cfg(not(windows))]
pub fn config_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".config")
        .join("smaliscan")
}

pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Defaults for `parse`. Command-line flags take precedence.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ScanConfig {
    pub suffix: Option<String>,
    pub jobs: Option<usize>,
    pub depth: Option<usize>,
    /// Globs added to `--exclude`.
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Defaults for the `draw-*` commands.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct GraphConfig {
    pub format: Option<OutputFormat>,
    pub engine: Option<LayoutEngine>,
    /// Extra Graphviz arguments used when `--args` is absent.
    pub args: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub graph: GraphConfig,
}

pub fn load_config() -> Result<Config> {
    let path = config_file_path();
    if path.exists() {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    } else {
        Ok(Config::default())
    }
}
