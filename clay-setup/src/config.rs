use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cli::{InstallArgs, UninstallArgs};

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub install: InstallConfig,

    #[serde(default)]
    pub uninstall: UninstallConfig,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct InstallConfig {
    #[serde(default = "default_install_dir")]
    pub install_dir: String,

    #[serde(default = "default_download_base")]
    pub download_base: String,

    #[serde(default = "default_repository")]
    pub repository: String,

    /// HTTP timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_source_fallback")]
    pub source_fallback: bool,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            install_dir: default_install_dir(),
            download_base: default_download_base(),
            repository: default_repository(),
            timeout: default_timeout(),
            source_fallback: default_source_fallback(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct UninstallConfig {
    /// Additional stray locations to offer for removal
    #[serde(default)]
    pub extra_paths: Vec<String>,

    #[serde(default)]
    pub fuzzy_path_cleanup: bool,
}

fn default_install_dir() -> String {
    "~/.clay/bin".to_string()
}

fn default_download_base() -> String {
    "https://github.com/clay-pm/clay/releases/latest/download".to_string()
}

fn default_repository() -> String {
    "https://github.com/clay-pm/clay.git".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_source_fallback() -> bool {
    true
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
            .map(|dirs| dirs.config_dir().join("clay-setup.toml"))
            .unwrap_or_else(|| PathBuf::from("~/.config/clay-setup.toml"))
    }

    /// Fill install options the command line left unset
    pub fn merge_install_args(&self, args: &mut InstallArgs) {
        if args.install_dir.is_none() {
            args.install_dir = Some(self.install.install_dir.clone());
        }

        if args.download_base.is_none() {
            args.download_base = Some(self.install.download_base.clone());
        }

        if !args.no_fallback && !self.install.source_fallback {
            args.no_fallback = true;
        }
    }

    pub fn merge_uninstall_args(&self, args: &mut UninstallArgs) {
        if !args.fuzzy_path_cleanup && self.uninstall.fuzzy_path_cleanup {
            args.fuzzy_path_cleanup = true;
        }
    }
}
