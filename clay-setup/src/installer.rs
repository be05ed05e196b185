use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::acquire::{AcquireOptions, Acquirer, AcquisitionResult};
use crate::download::ArtifactFetcher;
use crate::env::EnvSnapshot;
use crate::error::SetupError;
use crate::install_dir::{self, InstallationState};
use crate::platform::TargetPlatform;
use crate::process::{Invocation, ProcessRunner};
use crate::profile::{self, PathUpdate};

#[derive(Debug, Clone)]
pub struct InstallOptions {
    pub install_dir: PathBuf,
    pub modify_path: bool,
    pub acquire: AcquireOptions,
}

#[derive(Debug)]
pub struct InstallReport {
    pub platform: TargetPlatform,
    pub acquisition: AcquisitionResult,
    pub state: InstallationState,
    /// `None` when profile editing was turned off
    pub path_update: Option<PathUpdate>,
}

pub struct Installer<'a, F, R> {
    env: &'a EnvSnapshot,
    options: InstallOptions,
    fetcher: F,
    runner: R,
}

impl<'a, F: ArtifactFetcher, R: ProcessRunner> Installer<'a, F, R> {
    pub fn new(env: &'a EnvSnapshot, options: InstallOptions, fetcher: F, runner: R) -> Self {
        Self {
            env,
            options,
            fetcher,
            runner,
        }
    }

    fn binary_path(&self) -> PathBuf {
        self.options.install_dir.join(&self.options.acquire.tool)
    }

    pub async fn run(&self, decide: &mut dyn FnMut(&str) -> bool) -> Result<InstallReport> {
        let tool = &self.options.acquire.tool;
        let before = InstallationState::probe(&self.binary_path());
        if before.exists {
            tracing::info!(
                "Existing {} at {} will be replaced",
                tool,
                before.binary_path.display()
            );
        }

        let platform = TargetPlatform::resolve(&self.env.os, &self.env.arch).map_err(|e| {
            tracing::error!("{}", e);
            e
        })?;
        tracing::info!("Installing {} for {}", tool, platform);

        let scratch = tempfile::Builder::new()
            .prefix("clay-setup-")
            .tempdir()
            .context("Failed to create scratch directory")?;

        let acquired = Acquirer::new(&self.fetcher, &self.runner, self.env, &self.options.acquire)
            .acquire(&platform, scratch.path())
            .await?;

        let state = install_dir::place_binary(&acquired.binary, &self.options.install_dir, tool)?;

        let scratch_path = scratch.path().to_path_buf();
        if let Err(e) = scratch.close() {
            tracing::warn!("Failed to remove {}: {}", scratch_path.display(), e);
        }

        let path_update = if self.options.modify_path {
            Some(profile::add_to_path(self.env, &self.options.install_dir, decide)?)
        } else {
            tracing::info!("Skipping shell profile update (--no-modify-path)");
            None
        };

        self.verify()?;

        tracing::info!("Installation completed successfully!");
        Ok(InstallReport {
            platform,
            acquisition: acquired.result(),
            state,
            path_update,
        })
    }

    /// The installed file must exist, be executable and answer `--version`.
    fn verify(&self) -> Result<()> {
        let binary = self.binary_path();
        let state = InstallationState::probe(&binary);

        if !state.is_installed() {
            return Err(SetupError::Verification {
                path: binary.display().to_string(),
                reason: format!(
                    "exists: {}, executable: {}",
                    state.exists, state.executable
                ),
            }
            .into());
        }

        let outcome = self
            .runner
            .run(&Invocation::new(&binary).arg("--version").quiet())
            .map_err(|e| SetupError::Verification {
                path: binary.display().to_string(),
                reason: format!("could not be started: {e}"),
            })?;

        if !outcome.success() {
            return Err(SetupError::Verification {
                path: binary.display().to_string(),
                reason: format!("--version exited with {:?}", outcome.code),
            }
            .into());
        }

        Ok(())
    }
}
