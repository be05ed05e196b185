use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use clay_bench::cli::Cli;
use clay_bench::config::Config;
use clay_bench::harness::{Harness, Tool};
use clay_bench::scenario;
use clay_setup::env::EnvSnapshot;
use clay_setup::process::SystemRunner;

fn main() -> Result<()> {
    let mut cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::load(&config_path).context("Failed to load configuration")?;
    config.merge_with_args(&mut cli);

    let env = EnvSnapshot::capture()?;

    let subject = Tool::clay(cli.clay.clone()).locate(&env)?;
    let reference = Tool::npm(cli.npm.clone().unwrap_or_else(|| PathBuf::from("npm"))).locate(&env)?;

    let workdir = cli
        .workdir
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("clay-bench"));
    tracing::info!("Benchmark workspaces under {}", workdir.display());

    let harness = Harness::new(SystemRunner, &workdir);
    let report = harness.run(&scenario::standard(), &subject, &reference)?;

    print!("{}", report.render_table());

    if let Some(path) = &cli.json {
        report
            .write_json(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!("Wrote {}", path.display());
    }

    Ok(())
}
