use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[clap(
    name = "clay-bench",
    version,
    about = "Compare clay install performance against npm",
    long_about = None
)]
pub struct Cli {
    /// clay binary to benchmark
    #[clap(long, default_value = "target/release/clay")]
    pub clay: PathBuf,

    /// npm executable (resolved on PATH when not given)
    #[clap(long, env = "CLAY_BENCH_NPM")]
    pub npm: Option<PathBuf>,

    /// Scratch directory for scenario workspaces
    #[clap(long)]
    pub workdir: Option<PathBuf>,

    /// Also write the report as JSON to this file
    #[clap(long)]
    pub json: Option<PathBuf>,

    /// Configuration file path (defaults to ~/.config/clay-bench.toml)
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[clap(long)]
    pub verbose: bool,
}
