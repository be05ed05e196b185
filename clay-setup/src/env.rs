use std::path::{Path, PathBuf};

use crate::error::{Result, SetupError};

/// Shell family derived from `$SHELL`, used to pick startup files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellFamily {
    Zsh,
    Bash,
    Fish,
    Posix,
}

/// A read-only picture of the process environment taken once per run.
///
/// Nothing in this crate reads `PATH`, `SHELL` or `HOME` directly; it goes
/// through a snapshot so tests can describe any machine by hand.
#[derive(Debug, Clone)]
pub struct EnvSnapshot {
    pub os: String,
    pub arch: String,
    pub home: PathBuf,
    pub path: Vec<PathBuf>,
    pub shell: Option<String>,
}

impl EnvSnapshot {
    /// Capture the live environment of the current process
    pub fn capture() -> Result<Self> {
        let home = directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().to_path_buf())
            .ok_or(SetupError::NoHomeDirectory)?;

        let path = std::env::var_os("PATH")
            .map(|raw| std::env::split_paths(&raw).collect())
            .unwrap_or_default();

        Ok(Self {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            home,
            path,
            shell: std::env::var("SHELL").ok(),
        })
    }

    pub fn shell_family(&self) -> ShellFamily {
        let name = self
            .shell
            .as_deref()
            .and_then(|s| Path::new(s).file_name())
            .and_then(|n| n.to_str())
            .unwrap_or("");

        match name {
            "zsh" => ShellFamily::Zsh,
            "bash" => ShellFamily::Bash,
            "fish" => ShellFamily::Fish,
            _ => ShellFamily::Posix,
        }
    }

    /// Whether `dir` is one of the search path entries
    pub fn path_contains(&self, dir: &Path) -> bool {
        let wanted = normalize(dir);
        self.path.iter().any(|entry| normalize(entry) == wanted)
    }

    /// Resolve an executable by name along the search path
    pub fn which(&self, name: &str) -> Option<PathBuf> {
        if self.path.is_empty() {
            return None;
        }
        let search_path = std::env::join_paths(&self.path).ok()?;
        which::which_in(name, Some(search_path), &self.home).ok()
    }
}

fn normalize(path: &Path) -> String {
    let s = path.to_string_lossy();
    let trimmed = s.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils;
    use std::fs;
    use tempfile::tempdir;

    fn snapshot(shell: Option<&str>, path: Vec<PathBuf>) -> EnvSnapshot {
        EnvSnapshot {
            os: "linux".to_string(),
            arch: "x86_64".to_string(),
            home: PathBuf::from("/home/test"),
            path,
            shell: shell.map(str::to_string),
        }
    }

    #[test]
    fn test_shell_family() {
        assert_eq!(snapshot(Some("/bin/zsh"), vec![]).shell_family(), ShellFamily::Zsh);
        assert_eq!(
            snapshot(Some("/usr/local/bin/bash"), vec![]).shell_family(),
            ShellFamily::Bash
        );
        assert_eq!(snapshot(Some("fish"), vec![]).shell_family(), ShellFamily::Fish);
        assert_eq!(snapshot(Some("/bin/dash"), vec![]).shell_family(), ShellFamily::Posix);
        assert_eq!(snapshot(None, vec![]).shell_family(), ShellFamily::Posix);
    }

    #[test]
    fn test_path_contains_ignores_trailing_slash() {
        let env = snapshot(None, vec![PathBuf::from("/usr/bin"), PathBuf::from("/opt/x/bin/")]);
        assert!(env.path_contains(Path::new("/usr/bin/")));
        assert!(env.path_contains(Path::new("/opt/x/bin")));
        assert!(!env.path_contains(Path::new("/opt/x")));
    }

    #[cfg(unix)]
    #[test]
    fn test_which_finds_executables_only() {
        let dir = tempdir().unwrap();
        let exe = dir.path().join("git");
        fs::write(&exe, "#!/bin/sh\n").unwrap();
        utils::make_executable(&exe).unwrap();
        fs::write(dir.path().join("cargo"), "not executable").unwrap();

        let env = snapshot(None, vec![PathBuf::from("/nonexistent"), dir.path().to_path_buf()]);
        assert_eq!(env.which("git"), Some(exe));
        assert_eq!(env.which("cargo"), None);
        assert_eq!(env.which("missing"), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_which_skips_directories_and_non_executable_entries() {
        let first = tempdir().unwrap();
        let second = tempdir().unwrap();
        fs::create_dir(first.path().join("node")).unwrap();
        fs::write(first.path().join("npm"), "#!/bin/sh\n").unwrap();
        let npm = second.path().join("npm");
        fs::write(&npm, "#!/bin/sh\n").unwrap();
        utils::make_executable(&npm).unwrap();

        let env = snapshot(
            None,
            vec![first.path().to_path_buf(), second.path().to_path_buf()],
        );
        assert_eq!(env.which("node"), None);
        assert_eq!(env.which("npm"), Some(npm));
        assert_eq!(snapshot(None, vec![]).which("npm"), None);
    }
}
