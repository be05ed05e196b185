//! Sequential timing of two install commands across the fixed scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use clay_setup::env::EnvSnapshot;
use clay_setup::process::{Invocation, ProcessRunner};
use clay_setup::utils;

use crate::error::{BenchError, Result};
use crate::report::{BenchmarkReport, ScenarioReport, ToolStats, TrialResult};
use crate::scenario::{Scenario, REPETITIONS};

/// An install command under test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tool {
    pub name: String,
    pub program: PathBuf,
    /// Files the tool writes next to `package.json`, removed before each run
    pub lock_artifacts: Vec<&'static str>,
}

impl Tool {
    pub fn clay(program: impl Into<PathBuf>) -> Self {
        Self {
            name: "clay".to_string(),
            program: program.into(),
            lock_artifacts: vec!["fnpm-lock.json"],
        }
    }

    pub fn npm(program: impl Into<PathBuf>) -> Self {
        Self {
            name: "npm".to_string(),
            program: program.into(),
            lock_artifacts: vec!["package-lock.json"],
        }
    }

    /// Resolve `program` to an executable: paths are checked as given, bare
    /// names are looked up on the search path.
    pub fn locate(mut self, env: &EnvSnapshot) -> Result<Self> {
        let is_bare = self.program.components().count() == 1;

        let found = if is_bare {
            env.which(&self.program.to_string_lossy())
        } else {
            Some(self.program.clone()).filter(|p| runnable(p))
        };

        match found {
            Some(path) => {
                tracing::debug!("Using {} at {}", self.name, path.display());
                self.program = path;
                Ok(self)
            }
            None => Err(BenchError::ToolNotFound {
                tool: self.name,
                path: self.program,
            }),
        }
    }
}

pub struct Harness<R> {
    runner: R,
    workdir: PathBuf,
}

impl<R: ProcessRunner> Harness<R> {
    pub fn new(runner: R, workdir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            workdir: workdir.into(),
        }
    }

    /// Run every scenario for `subject` then `reference`. Any failed trial
    /// aborts the whole run.
    pub fn run(
        &self,
        scenarios: &[Scenario],
        subject: &Tool,
        reference: &Tool,
    ) -> Result<BenchmarkReport> {
        for tool in [subject, reference] {
            if !runnable(&tool.program) {
                return Err(BenchError::ToolNotFound {
                    tool: tool.name.clone(),
                    path: tool.program.clone(),
                });
            }
        }

        let mut trials = Vec::new();
        let mut reports = Vec::new();

        for scenario in scenarios {
            tracing::info!(
                "Scenario {} ({} packages)",
                scenario.name,
                scenario.packages.len()
            );

            let mut scenario_trials = Vec::new();
            for tool in [subject, reference] {
                scenario_trials.extend(self.run_tool(scenario, tool)?);
            }

            let report = ScenarioReport::compare(
                scenario.name,
                ToolStats::from_trials(&subject.name, &scenario_trials),
                ToolStats::from_trials(&reference.name, &scenario_trials),
            );
            tracing::info!("{}: {}", scenario.name, report.summary());

            reports.push(report);
            trials.extend(scenario_trials);
        }

        Ok(BenchmarkReport {
            trials,
            scenarios: reports,
        })
    }

    fn run_tool(&self, scenario: &Scenario, tool: &Tool) -> Result<Vec<TrialResult>> {
        let workspace = self.workdir.join(scenario.name).join(&tool.name);
        prepare_workspace(&workspace, scenario)?;

        if scenario.warm_cache {
            tracing::debug!("Priming {} in {}", tool.name, workspace.display());
            self.install(scenario, tool, &workspace, 0)?;
        }

        let mut trials = Vec::with_capacity(REPETITIONS);
        for run_index in 1..=REPETITIONS {
            if !scenario.warm_cache {
                clear(&workspace.join("node_modules"))?;
            }
            for artifact in &tool.lock_artifacts {
                clear(&workspace.join(artifact))?;
            }

            let duration_millis = self.install(scenario, tool, &workspace, run_index)?;
            tracing::info!(
                "  {} run {}/{}: {} ms",
                tool.name,
                run_index,
                REPETITIONS,
                duration_millis
            );

            trials.push(TrialResult {
                scenario: scenario.name.to_string(),
                tool: tool.name.clone(),
                run_index,
                duration_millis,
            });
        }

        Ok(trials)
    }

    /// Run one install and return its wall-clock milliseconds
    fn install(&self, scenario: &Scenario, tool: &Tool, workspace: &Path, run: usize) -> Result<u64> {
        let invocation = Invocation::new(&tool.program)
            .arg("install")
            .args(scenario.packages)
            .current_dir(workspace)
            .quiet();

        let outcome = self
            .runner
            .run(&invocation)
            .map_err(|source| BenchError::Spawn {
                tool: tool.name.clone(),
                source,
            })?;

        if !outcome.success() {
            tracing::error!("{} exited with {:?}", invocation, outcome.code);
            return Err(BenchError::TrialFailed {
                scenario: scenario.name.to_string(),
                tool: tool.name.clone(),
                run,
                code: outcome.code,
            });
        }

        Ok(u64::try_from(outcome.elapsed.as_millis()).unwrap_or(u64::MAX))
    }
}

fn runnable(path: &Path) -> bool {
    path.is_file() && utils::is_executable(path).unwrap_or(false)
}

/// Remove `path` if it exists
fn clear(path: &Path) -> std::io::Result<()> {
    match utils::remove_path(path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

/// Recreate an empty workspace holding a dependency-free `package.json`
fn prepare_workspace(workspace: &Path, scenario: &Scenario) -> Result<()> {
    clear(workspace)?;
    fs::create_dir_all(workspace)?;

    let manifest = serde_json::json!({
        "name": format!("clay-bench-{}", scenario.name),
        "version": "1.0.0",
        "private": true,
        "dependencies": {},
    });
    fs::write(
        workspace.join("package.json"),
        serde_json::to_string_pretty(&manifest)?,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_prepare_workspace_starts_empty() {
        let dir = tempdir().unwrap();
        let workspace = dir.path().join("single-package").join("clay");
        fs::create_dir_all(workspace.join("node_modules/lodash")).unwrap();
        fs::write(workspace.join("fnpm-lock.json"), "").unwrap();

        let scenario = crate::scenario::standard()[0];
        prepare_workspace(&workspace, &scenario).unwrap();

        let entries: Vec<String> = fs::read_dir(&workspace)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(entries, vec!["package.json"]);

        let manifest: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(workspace.join("package.json")).unwrap())
                .unwrap();
        assert_eq!(manifest["dependencies"], serde_json::json!({}));
    }

    #[test]
    fn test_lock_artifacts_per_tool() {
        assert_eq!(Tool::clay("clay").lock_artifacts, vec!["fnpm-lock.json"]);
        assert_eq!(Tool::npm("npm").lock_artifacts, vec!["package-lock.json"]);
    }

    #[test]
    fn test_locate_bare_name_on_path() {
        let dir = tempdir().unwrap();
        let npm = dir.path().join("npm");
        fs::write(&npm, "#!/bin/sh\n").unwrap();
        utils::make_executable(&npm).unwrap();

        let env = EnvSnapshot {
            os: "linux".to_string(),
            arch: "x86_64".to_string(),
            home: dir.path().to_path_buf(),
            path: vec![dir.path().to_path_buf()],
            shell: None,
        };

        let tool = Tool::npm("npm").locate(&env).unwrap();
        assert_eq!(tool.program, npm);

        let missing = Tool::clay(dir.path().join("target/release/clay")).locate(&env);
        assert!(matches!(missing, Err(BenchError::ToolNotFound { .. })));
    }
}
