//! Aggregation of trial timings into per-scenario comparisons.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::Path;

use crate::error::Result;

/// Deltas below this percentage are reported as a tie
pub const TIE_THRESHOLD_PERCENT: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    pub scenario: String,
    pub tool: String,
    /// 1-based
    pub run_index: usize,
    pub duration_millis: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolStats {
    pub tool: String,
    pub average_millis: f64,
    pub runs: Vec<u64>,
}

impl ToolStats {
    pub fn from_trials(tool: &str, trials: &[TrialResult]) -> Self {
        let runs: Vec<u64> = trials
            .iter()
            .filter(|t| t.tool == tool)
            .map(|t| t.duration_millis)
            .collect();

        let average_millis = if runs.is_empty() {
            0.0
        } else {
            runs.iter().map(|&r| r as f64).sum::<f64>() / runs.len() as f64
        };

        Self {
            tool: tool.to_string(),
            average_millis,
            runs,
        }
    }
}

/// How the measured tool fared against the reference tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Faster,
    Slower,
    Tied,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Faster => write!(f, "faster"),
            Verdict::Slower => write!(f, "slower"),
            Verdict::Tied => write!(f, "tied"),
        }
    }
}

/// Percentage by which the faster mean beats the slower one
pub fn delta_percent(a: f64, b: f64) -> f64 {
    let slower = a.max(b);
    if slower <= 0.0 {
        return 0.0;
    }
    (a - b).abs() / slower * 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub scenario: String,
    pub subject: ToolStats,
    pub reference: ToolStats,
    /// Verdict for `subject`
    pub verdict: Verdict,
    pub delta_percent: f64,
}

impl ScenarioReport {
    pub fn compare(scenario: &str, subject: ToolStats, reference: ToolStats) -> Self {
        let delta = delta_percent(subject.average_millis, reference.average_millis);

        let verdict = if delta < TIE_THRESHOLD_PERCENT {
            Verdict::Tied
        } else if subject.average_millis < reference.average_millis {
            Verdict::Faster
        } else {
            Verdict::Slower
        };

        Self {
            scenario: scenario.to_string(),
            subject,
            reference,
            verdict,
            delta_percent: delta,
        }
    }

    /// One-line human summary, e.g. `clay is 42.0% faster than npm`
    pub fn summary(&self) -> String {
        match self.verdict {
            Verdict::Tied => format!(
                "{} and {} are tied ({:.1}%)",
                self.subject.tool, self.reference.tool, self.delta_percent
            ),
            verdict => format!(
                "{} is {:.1}% {} than {}",
                self.subject.tool, self.delta_percent, verdict, self.reference.tool
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub trials: Vec<TrialResult>,
    pub scenarios: Vec<ScenarioReport>,
}

impl BenchmarkReport {
    pub fn render_table(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:<16} {:<6} {:>12}  {:<24} {}",
            "scenario", "tool", "mean (ms)", "runs (ms)", "verdict"
        );

        for report in &self.scenarios {
            for stats in [&report.subject, &report.reference] {
                let runs = stats
                    .runs
                    .iter()
                    .map(|r| r.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                let verdict = if stats.tool == report.subject.tool {
                    report.summary()
                } else {
                    String::new()
                };
                let _ = writeln!(
                    out,
                    "{:<16} {:<6} {:>12.1}  {:<24} {}",
                    report.scenario, stats.tool, stats.average_millis, runs, verdict
                );
            }
        }

        out
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
