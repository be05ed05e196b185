use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use clay_setup::acquire::AcquireOptions;
use clay_setup::cli::{Cli, Command, InstallArgs, UninstallArgs};
use clay_setup::config::Config;
use clay_setup::download::HttpFetcher;
use clay_setup::env::EnvSnapshot;
use clay_setup::installer::{InstallOptions, Installer};
use clay_setup::layout::{InstallLayout, TOOL_NAME};
use clay_setup::process::SystemRunner;
use clay_setup::profile::PathUpdate;
use clay_setup::prompt;
use clay_setup::uninstaller::{UninstallOptions, UninstallOutcome, Uninstaller};
use clay_setup::utils;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::load(&config_path).context("Failed to load configuration")?;

    let env = EnvSnapshot::capture()?;

    match cli.command {
        Command::Install(mut args) => {
            config.merge_install_args(&mut args);
            install(&env, &config, args).await
        }
        Command::Uninstall(mut args) => {
            config.merge_uninstall_args(&mut args);
            uninstall(&env, &config, args)
        }
    }
}

fn layout_for(env: &EnvSnapshot, config: &Config, install_dir: Option<&str>) -> InstallLayout {
    let install_dir = install_dir.unwrap_or(&config.install.install_dir);
    InstallLayout::for_home(&env.home)
        .with_bin_dir(utils::expand_tilde(install_dir, &env.home))
        .with_stray_paths(
            config
                .uninstall
                .extra_paths
                .iter()
                .map(|p| utils::expand_tilde(p, &env.home)),
        )
}

async fn install(env: &EnvSnapshot, config: &Config, args: InstallArgs) -> Result<()> {
    let layout = layout_for(env, config, args.install_dir.as_deref());

    let options = InstallOptions {
        install_dir: layout.bin_dir.clone(),
        modify_path: !args.no_modify_path,
        acquire: AcquireOptions {
            tool: TOOL_NAME.to_string(),
            download_base: args
                .download_base
                .unwrap_or_else(|| config.install.download_base.clone()),
            repository: config.install.repository.clone(),
            source_fallback: !args.no_fallback,
        },
    };

    let fetcher = HttpFetcher::new(Duration::from_secs(config.install.timeout))?;
    let installer = Installer::new(env, options, fetcher, SystemRunner);

    let mut decide = prompt::decider(args.force);
    let report = installer.run(&mut *decide).await?;

    println!(
        "{} installed to {} ({}, {})",
        TOOL_NAME,
        report.state.binary_path.display(),
        report.platform,
        report.acquisition
    );
    match report.path_update {
        Some(PathUpdate::Appended(profile)) => println!(
            "Added {} to PATH in {}. Restart your shell or run: source {}",
            layout.bin_dir.display(),
            profile.display(),
            profile.display()
        ),
        Some(PathUpdate::NoProfile { line }) => println!(
            "Add {} to PATH by adding this line to your shell profile:\n  {}",
            layout.bin_dir.display(),
            line
        ),
        Some(PathUpdate::Declined(profile)) => println!(
            "{} was not modified; add {} to PATH yourself",
            profile.display(),
            layout.bin_dir.display()
        ),
        Some(PathUpdate::AlreadyOnPath) | Some(PathUpdate::AlreadyPresent(_)) | None => {}
    }

    Ok(())
}

fn uninstall(env: &EnvSnapshot, config: &Config, args: UninstallArgs) -> Result<()> {
    let layout = layout_for(env, config, args.install_dir.as_deref());

    let options = UninstallOptions {
        keep_cache: args.keep_cache,
        keep_config: args.keep_config,
        fuzzy_path_cleanup: args.fuzzy_path_cleanup,
    };

    let mut decide = prompt::decider(args.force);
    match Uninstaller::new(&layout, env, options).run(&mut *decide)? {
        UninstallOutcome::Cancelled => println!("Uninstall cancelled. Nothing was changed."),
        UninstallOutcome::Completed(summary) => print!("{}", summary.render()),
    }

    Ok(())
}
