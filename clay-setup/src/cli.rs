use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "clay-setup",
    version,
    about = "Install, verify and remove the clay package manager",
    long_about = None
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Command,

    /// Configuration file path (defaults to ~/.config/clay-setup.toml)
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[clap(long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Download (or build) clay and put it on PATH
    Install(InstallArgs),

    /// Remove clay, its cache, config and PATH entries
    Uninstall(UninstallArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct InstallArgs {
    /// Do not ask before editing shell startup files
    #[clap(short, long)]
    pub force: bool,

    /// Installation directory
    #[clap(short = 'd', long, env = "CLAY_INSTALL_DIR")]
    pub install_dir: Option<String>,

    /// Leave shell startup files alone
    #[clap(long)]
    pub no_modify_path: bool,

    /// Fail instead of building from source when no prebuilt binary exists
    #[clap(long)]
    pub no_fallback: bool,

    /// Base URL prebuilt archives are downloaded from
    #[clap(long, env = "CLAY_DOWNLOAD_BASE")]
    pub download_base: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct UninstallArgs {
    /// Answer yes to every removal prompt
    #[clap(short, long)]
    pub force: bool,

    /// Installation directory the binary was placed in
    #[clap(short = 'd', long, env = "CLAY_INSTALL_DIR")]
    pub install_dir: Option<String>,

    /// Keep the package cache
    #[clap(long)]
    pub keep_cache: bool,

    /// Keep the configuration directory
    #[clap(long)]
    pub keep_config: bool,

    /// When no marker block is found, drop every profile line mentioning clay
    #[clap(long)]
    pub fuzzy_path_cleanup: bool,
}
