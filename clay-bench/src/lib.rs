//! # clay-bench
//!
//! Times `clay install` against `npm install` on a fixed set of scenarios.
//!
//! Each scenario gets a fresh workspace per tool with an empty
//! `package.json`. Every tool installs the scenario's packages three times
//! (clearing `node_modules` and its lock files in between, except for the
//! warm-cache scenario which keeps `node_modules` after a priming install).
//! The report lists the mean and individual runs per tool and a verdict.
//!
//! ```bash
//! clay-bench --clay target/release/clay --json bench.json
//! ```

/// Command-line interface definitions
pub mod cli;

/// Configuration file handling
pub mod config;

pub mod error;

/// Workspace preparation and trial execution
pub mod harness;

/// Statistics, verdicts and output formats
pub mod report;

pub mod scenario;
