use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::download::{artifact_url, ArtifactFetcher, FetchOutcome};
use crate::env::EnvSnapshot;
use crate::error::{Result, SetupError};
use crate::platform::TargetPlatform;
use crate::process::{Invocation, ProcessRunner};
use crate::utils;

const GIT_HINT: &str = "your package manager or https://git-scm.com/downloads";
const CARGO_HINT: &str = "https://rustup.rs";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionResult {
    PrebuiltSuccess,
    PrebuiltUnavailable,
    SourceBuildSuccess,
    SourceBuildFailure,
}

impl fmt::Display for AcquisitionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AcquisitionResult::PrebuiltSuccess => "prebuilt-success",
            AcquisitionResult::PrebuiltUnavailable => "prebuilt-unavailable",
            AcquisitionResult::SourceBuildSuccess => "source-build-success",
            AcquisitionResult::SourceBuildFailure => "source-build-failure",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone)]
pub struct AcquireOptions {
    pub tool: String,
    pub download_base: String,
    pub repository: String,
    pub source_fallback: bool,
}

/// A runnable binary somewhere inside the scratch directory.
#[derive(Debug)]
pub struct Acquired {
    pub binary: PathBuf,
    /// Outcome of every tier that was attempted, in order
    pub tiers: Vec<AcquisitionResult>,
}

impl Acquired {
    pub fn result(&self) -> AcquisitionResult {
        self.tiers
            .last()
            .copied()
            .unwrap_or(AcquisitionResult::PrebuiltUnavailable)
    }
}

pub struct Acquirer<'a, F, R> {
    fetcher: &'a F,
    runner: &'a R,
    env: &'a EnvSnapshot,
    options: &'a AcquireOptions,
}

impl<'a, F: ArtifactFetcher, R: ProcessRunner> Acquirer<'a, F, R> {
    pub fn new(
        fetcher: &'a F,
        runner: &'a R,
        env: &'a EnvSnapshot,
        options: &'a AcquireOptions,
    ) -> Self {
        Self {
            fetcher,
            runner,
            env,
            options,
        }
    }

    /// Obtain a binary for `platform` under `scratch`, prebuilt first.
    pub async fn acquire(&self, platform: &TargetPlatform, scratch: &Path) -> Result<Acquired> {
        if let Some(binary) = self.try_prebuilt(platform, scratch).await {
            return Ok(Acquired {
                binary,
                tiers: vec![AcquisitionResult::PrebuiltSuccess],
            });
        }

        if !self.options.source_fallback {
            return Err(SetupError::PrebuiltUnavailable {
                target: platform.triple().to_string(),
            });
        }

        tracing::info!("Falling back to building {} from source", self.options.tool);

        match self.build_from_source(scratch) {
            Ok(binary) => Ok(Acquired {
                binary,
                tiers: vec![
                    AcquisitionResult::PrebuiltUnavailable,
                    AcquisitionResult::SourceBuildSuccess,
                ],
            }),
            Err(e) => {
                tracing::error!("{}: {}", AcquisitionResult::SourceBuildFailure, e);
                Err(e)
            }
        }
    }

    async fn try_prebuilt(&self, platform: &TargetPlatform, scratch: &Path) -> Option<PathBuf> {
        let url = artifact_url(&self.options.download_base, &self.options.tool, platform);
        let archive = scratch.join(format!("{}-{}.tar.gz", self.options.tool, platform.triple()));

        if let FetchOutcome::Unavailable { reason } = self.fetcher.fetch(&url, &archive).await {
            tracing::info!("{} ({})", AcquisitionResult::PrebuiltUnavailable, reason);
            return None;
        }

        let unpack_dir = scratch.join("prebuilt");
        let found = fs::create_dir_all(&unpack_dir)
            .map_err(anyhow::Error::from)
            .and_then(|_| utils::extract_tar_gz(&archive, &unpack_dir))
            .and_then(|_| utils::find_executable(&unpack_dir, &self.options.tool));

        match found {
            Ok(Some(binary)) => {
                tracing::info!("Using prebuilt binary for {}", platform);
                Some(binary)
            }
            Ok(None) => {
                tracing::warn!(
                    "Archive from {} does not contain an executable named {}",
                    url,
                    self.options.tool
                );
                None
            }
            Err(e) => {
                tracing::warn!("Could not unpack {}: {}", url, e);
                None
            }
        }
    }

    fn build_from_source(&self, scratch: &Path) -> Result<PathBuf> {
        let git = self.require_tool("git", GIT_HINT)?;
        let cargo = self.require_tool("cargo", CARGO_HINT)?;

        let source_dir = scratch.join("source");
        if source_dir.exists() {
            fs::remove_dir_all(&source_dir)?;
        }

        tracing::info!("Cloning {}", self.options.repository);
        let clone = Invocation::new(git)
            .args(["clone", "--depth", "1"])
            .arg(&self.options.repository)
            .arg(&source_dir)
            .current_dir(scratch);
        let outcome = self.runner.run(&clone).map_err(|e| {
            tracing::error!("Could not start git: {}", e);
            SetupError::CloneFailed {
                repository: self.options.repository.clone(),
                code: None,
            }
        })?;
        if !outcome.success() {
            return Err(SetupError::CloneFailed {
                repository: self.options.repository.clone(),
                code: outcome.code,
            });
        }

        tracing::info!("Building {} in release mode", self.options.tool);
        let build = Invocation::new(cargo)
            .args(["build", "--release"])
            .current_dir(&source_dir);
        let outcome = self.runner.run(&build).map_err(|e| {
            tracing::error!("Could not start cargo: {}", e);
            SetupError::BuildFailed {
                path: source_dir.display().to_string(),
                code: None,
            }
        })?;
        if !outcome.success() {
            return Err(SetupError::BuildFailed {
                path: source_dir.display().to_string(),
                code: outcome.code,
            });
        }

        let binary = source_dir
            .join("target")
            .join("release")
            .join(&self.options.tool);
        if !binary.is_file() {
            return Err(SetupError::BuiltBinaryNotFound {
                path: binary.display().to_string(),
            });
        }

        Ok(binary)
    }

    fn require_tool(&self, name: &str, hint: &str) -> Result<PathBuf> {
        self.env.which(name).ok_or_else(|| SetupError::MissingToolchain {
            tool: name.to_string(),
            hint: hint.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_display() {
        assert_eq!(
            AcquisitionResult::PrebuiltUnavailable.to_string(),
            "prebuilt-unavailable"
        );
        assert_eq!(
            AcquisitionResult::SourceBuildSuccess.to_string(),
            "source-build-success"
        );
    }

    #[test]
    fn test_acquired_result_is_last_tier() {
        let acquired = Acquired {
            binary: PathBuf::from("/tmp/clay"),
            tiers: vec![
                AcquisitionResult::PrebuiltUnavailable,
                AcquisitionResult::SourceBuildSuccess,
            ],
        };
        assert_eq!(acquired.result(), AcquisitionResult::SourceBuildSuccess);
    }
}
