use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cli::Cli;

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub bench: BenchConfig,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct BenchConfig {
    /// npm executable used when `--npm` is not given
    pub npm: Option<String>,

    /// Scratch directory used when `--workdir` is not given
    pub workdir: Option<String>,

    /// Report file written when `--json` is not given
    pub json: Option<String>,
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        Ok(config)
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        directories::BaseDirs::new()
            .map(|dirs| dirs.config_dir().join("clay-bench.toml"))
            .unwrap_or_else(|| PathBuf::from("~/.config/clay-bench.toml"))
    }

    /// Merge configuration with command line arguments
    pub fn merge_with_args(&self, cli: &mut Cli) {
        if cli.npm.is_none() {
            cli.npm = self.bench.npm.as_ref().map(PathBuf::from);
        }

        if cli.workdir.is_none() {
            cli.workdir = self.bench.workdir.as_ref().map(PathBuf::from);
        }

        if cli.json.is_none() {
            cli.json = self.bench.json.as_ref().map(PathBuf::from);
        }
    }
}
