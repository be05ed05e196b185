use anyhow::Result;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use crate::env::EnvSnapshot;
use crate::install_dir::InstallationState;
use crate::layout::InstallLayout;
use crate::profile::{self, ProfileCleanup};
use crate::utils;

#[derive(Debug, Clone, Default)]
pub struct UninstallOptions {
    pub keep_cache: bool,
    pub keep_config: bool,
    pub fuzzy_path_cleanup: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    Removed,
    AlreadyClean,
    /// Kept on purpose (retention flag or declined)
    Preserved,
    Skipped,
    Failed(String),
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepStatus::Removed => f.write_str("removed"),
            StepStatus::AlreadyClean => f.write_str("already clean"),
            StepStatus::Preserved => f.write_str("preserved"),
            StepStatus::Skipped => f.write_str("skipped"),
            StepStatus::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub step: String,
    pub status: StepStatus,
}

/// State re-read from disk after all steps ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveStatus {
    pub binary_present: bool,
    pub cache_present: bool,
    pub config_present: bool,
    pub on_path: bool,
}

impl LiveStatus {
    pub fn probe(layout: &InstallLayout, env: &EnvSnapshot) -> Self {
        Self {
            binary_present: layout.binary().exists(),
            cache_present: layout.cache_dir.exists(),
            config_present: layout.config_dir.exists(),
            on_path: env.which(&layout.tool).is_some(),
        }
    }

    pub fn is_clean(&self) -> bool {
        !(self.binary_present || self.cache_present || self.config_present || self.on_path)
    }
}

#[derive(Debug, Clone)]
pub struct UninstallSummary {
    pub steps: Vec<StepReport>,
    pub live: LiveStatus,
}

impl UninstallSummary {
    pub fn status_of(&self, step: &str) -> Option<&StepStatus> {
        self.steps.iter().find(|s| s.step == step).map(|s| &s.status)
    }

    pub fn render(&self) -> String {
        fn present(yes: bool) -> &'static str {
            if yes {
                "still present"
            } else {
                "gone"
            }
        }

        let mut out = String::from("=== Uninstall summary ===\n");
        for step in &self.steps {
            out.push_str(&format!("  {:<48} {}\n", step.step, step.status));
        }
        out.push_str(&format!("  binary: {}\n", present(self.live.binary_present)));
        out.push_str(&format!("  cache:  {}\n", present(self.live.cache_present)));
        out.push_str(&format!("  config: {}\n", present(self.live.config_present)));
        out.push_str(&format!(
            "  PATH:   {}\n",
            if self.live.on_path {
                "clay still resolves"
            } else {
                "clay no longer resolves"
            }
        ));
        out
    }
}

#[derive(Debug, Clone)]
pub enum UninstallOutcome {
    /// Declined at the first prompt; nothing was touched
    Cancelled,
    Completed(UninstallSummary),
}

pub struct Uninstaller<'a> {
    layout: &'a InstallLayout,
    env: &'a EnvSnapshot,
    options: UninstallOptions,
}

impl<'a> Uninstaller<'a> {
    pub fn new(layout: &'a InstallLayout, env: &'a EnvSnapshot, options: UninstallOptions) -> Self {
        Self {
            layout,
            env,
            options,
        }
    }

    pub fn run(&self, decide: &mut dyn FnMut(&str) -> bool) -> Result<UninstallOutcome> {
        let state = InstallationState::probe(&self.layout.binary());

        if !self.confirm_intent(&state, decide) {
            tracing::info!("Uninstall cancelled; nothing was changed");
            return Ok(UninstallOutcome::Cancelled);
        }

        let mut steps = vec![self.remove_binary(&state)];

        steps.push(self.remove_dir_step(
            "package cache",
            &self.layout.cache_dir,
            self.options.keep_cache,
            decide,
        ));
        steps.push(self.remove_dir_step(
            "configuration",
            &self.layout.config_dir,
            self.options.keep_config,
            decide,
        ));

        for path in self.layout.shell_profiles() {
            if let Some(report) = self.clean_profile(&path, decide) {
                steps.push(report);
            }
        }

        for path in &self.layout.stray_paths {
            if let Some(report) = self.sweep_stray(path, decide) {
                steps.push(report);
            }
        }

        remove_if_empty(&self.layout.root);

        let summary = UninstallSummary {
            steps,
            live: LiveStatus::probe(self.layout, self.env),
        };

        if summary.live.is_clean() {
            tracing::info!("{} has been removed", self.layout.tool);
        } else {
            tracing::warn!("Some {} files are still present", self.layout.tool);
        }

        Ok(UninstallOutcome::Completed(summary))
    }

    fn confirm_intent(&self, state: &InstallationState, decide: &mut dyn FnMut(&str) -> bool) -> bool {
        let binary = state.binary_path.display();

        if state.exists {
            return decide(&format!("Remove {} from {}?", self.layout.tool, binary));
        }

        match self.env.which(&self.layout.tool) {
            Some(found) => {
                tracing::warn!(
                    "{} not found at {}, but {} is on PATH",
                    self.layout.tool,
                    binary,
                    found.display()
                );
                decide(&format!(
                    "{} is not installed at {}. Clean up remaining files anyway?",
                    self.layout.tool, binary
                ))
            }
            None => {
                tracing::warn!("{} binary not found at {} or on PATH", self.layout.tool, binary);
                decide(&format!(
                    "{} does not appear to be installed. Clean up remaining files anyway?",
                    self.layout.tool
                ))
            }
        }
    }

    fn remove_binary(&self, state: &InstallationState) -> StepReport {
        let step = format!("binary {}", state.binary_path.display());

        if !state.exists {
            tracing::warn!("Binary not found at {}", state.binary_path.display());
            return StepReport {
                step,
                status: StepStatus::AlreadyClean,
            };
        }

        let status = match fs::remove_file(&state.binary_path) {
            Ok(()) => {
                tracing::info!("Removed {}", state.binary_path.display());
                StepStatus::Removed
            }
            Err(e) => failed(&state.binary_path, e),
        };

        if self.layout.bin_dir.starts_with(&self.layout.root) {
            remove_if_empty(&self.layout.bin_dir);
        }

        StepReport { step, status }
    }

    fn remove_dir_step(
        &self,
        label: &str,
        dir: &Path,
        keep: bool,
        decide: &mut dyn FnMut(&str) -> bool,
    ) -> StepReport {
        let step = format!("{} {}", label, dir.display());

        let status = if keep {
            tracing::info!("Keeping {} at {}", label, dir.display());
            StepStatus::Preserved
        } else if !dir.exists() {
            StepStatus::AlreadyClean
        } else if !decide(&format!("Remove {} at {}?", label, dir.display())) {
            tracing::info!("Preserved {} at {}", label, dir.display());
            StepStatus::Preserved
        } else {
            match fs::remove_dir_all(dir) {
                Ok(()) => {
                    tracing::info!("Removed {}", dir.display());
                    StepStatus::Removed
                }
                Err(e) => failed(dir, e),
            }
        };

        StepReport { step, status }
    }

    /// `None` for profiles that do not exist
    fn clean_profile(&self, path: &Path, decide: &mut dyn FnMut(&str) -> bool) -> Option<StepReport> {
        let step = format!("PATH entry in {}", path.display());

        let status = match profile::remove_from_profile(
            path,
            &self.layout.bin_dir,
            &self.layout.tool,
            self.options.fuzzy_path_cleanup,
            decide,
        ) {
            Ok(ProfileCleanup::Missing) => return None,
            Ok(ProfileCleanup::Clean) => StepStatus::AlreadyClean,
            Ok(ProfileCleanup::Removed { .. }) | Ok(ProfileCleanup::FuzzyRemoved { .. }) => {
                StepStatus::Removed
            }
            Ok(ProfileCleanup::LeftInPlace) | Ok(ProfileCleanup::Declined) => StepStatus::Skipped,
            Err(e) => {
                tracing::warn!("Could not clean {}: {:#}", path.display(), e);
                StepStatus::Failed(format!("{e:#}"))
            }
        };

        Some(StepReport { step, status })
    }

    /// `None` for locations that do not exist
    fn sweep_stray(&self, path: &Path, decide: &mut dyn FnMut(&str) -> bool) -> Option<StepReport> {
        let step = format!("stray {}", path.display());

        match fs::symlink_metadata(path) {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                return Some(StepReport {
                    step,
                    status: failed(path, e),
                })
            }
        }

        let status = if !decide(&format!("Remove {}?", path.display())) {
            StepStatus::Skipped
        } else {
            match utils::remove_path(path) {
                Ok(()) => {
                    tracing::info!("Removed {}", path.display());
                    StepStatus::Removed
                }
                Err(e) => failed(path, e),
            }
        };

        Some(StepReport { step, status })
    }
}

fn failed(path: &Path, e: io::Error) -> StepStatus {
    if e.kind() == io::ErrorKind::PermissionDenied {
        tracing::warn!(
            "Permission denied removing {}; rerun with elevated privileges to remove it",
            path.display()
        );
    } else {
        tracing::warn!("Failed to remove {}: {}", path.display(), e);
    }
    StepStatus::Failed(e.to_string())
}

fn remove_if_empty(dir: &Path) {
    let is_empty = fs::read_dir(dir)
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false);
    if is_empty {
        if let Err(e) = fs::remove_dir(dir) {
            tracing::debug!("Leaving {}: {}", dir.display(), e);
        }
    }
}
