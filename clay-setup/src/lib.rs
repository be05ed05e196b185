//! # clay-setup
//!
//! Installs, verifies and removes the `clay` package manager binary.
//!
//! ## Overview
//!
//! `clay-setup install` resolves the host platform to a target triple,
//! downloads the matching prebuilt archive (or clones and builds clay from
//! source when none is published), places the binary in `~/.clay/bin` and adds
//! that directory to the user's shell startup file exactly once.
//!
//! `clay-setup uninstall` walks the reverse path: binary, package cache,
//! configuration, shell profile entries (backing every edited profile up to
//! `<profile>.clay-backup`) and a list of legacy install locations. Every
//! destructive step is confirmed unless `--force` is given, and the final
//! summary is re-read from disk.
//!
//! ## Usage
//!
//! ```bash
//! # Install into the default location
//! clay-setup install
//!
//! # Install somewhere else without touching shell profiles
//! clay-setup install --install-dir /opt/clay/bin --no-modify-path
//!
//! # Remove everything except the package cache, without prompts
//! clay-setup uninstall --force --keep-cache
//! ```
//!
//! ## Configuration
//!
//! Defaults can be changed in `~/.config/clay-setup.toml`.

/// Command-line interface definitions and argument parsing
pub mod cli;

/// Configuration file handling
pub mod config;

/// Error types
pub mod error;

/// Snapshot of the process environment (OS, PATH, shell, home)
pub mod env;

/// Well-known install, cache and config locations
pub mod layout;

/// Mapping raw OS/arch names to a target triple
pub mod platform;

/// External process capability shared with the benchmark harness
pub mod process;

/// Prebuilt archive download
pub mod download;

/// Prebuilt-then-source acquisition
pub mod acquire;

/// Install directory creation and binary placement
pub mod install_dir;

/// Shell startup file editing
pub mod profile;

/// Yes/no decision functions
pub mod prompt;

/// The install pipeline
pub mod installer;

/// The uninstall flow
pub mod uninstaller;

/// Archive extraction and file permission helpers
pub mod utils;
