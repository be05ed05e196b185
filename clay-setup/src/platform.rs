use std::fmt;

use crate::error::{Result, SetupError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    Linux,
    Darwin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    X86_64,
    Aarch64,
}

/// The platform a prebuilt artifact is selected for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetPlatform {
    pub os: Os,
    pub arch: Arch,
}

impl TargetPlatform {
    /// Map raw OS and machine names (as reported by `uname` or
    /// `std::env::consts`) to a supported platform.
    ///
    /// The OS is checked first so that e.g. `windows`/`x86_64` reports the
    /// operating system as the problem.
    pub fn resolve(os: &str, arch: &str) -> Result<Self> {
        let os = match os.to_ascii_lowercase().as_str() {
            "linux" => Os::Linux,
            "darwin" | "macos" => Os::Darwin,
            _ => {
                return Err(SetupError::UnsupportedOs { os: os.to_string() });
            }
        };

        let arch = match arch.to_ascii_lowercase().as_str() {
            "x86_64" | "amd64" => Arch::X86_64,
            "aarch64" | "arm64" => Arch::Aarch64,
            _ => {
                return Err(SetupError::UnsupportedArch {
                    arch: arch.to_string(),
                });
            }
        };

        Ok(Self { os, arch })
    }

    /// Canonical target triple, e.g. `aarch64-apple-darwin`
    pub fn triple(&self) -> &'static str {
        match (self.arch, self.os) {
            (Arch::X86_64, Os::Linux) => "x86_64-unknown-linux-gnu",
            (Arch::Aarch64, Os::Linux) => "aarch64-unknown-linux-gnu",
            (Arch::X86_64, Os::Darwin) => "x86_64-apple-darwin",
            (Arch::Aarch64, Os::Darwin) => "aarch64-apple-darwin",
        }
    }
}

impl fmt::Display for TargetPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.triple())
    }
}
