use std::path::{Path, PathBuf};

/// Name of the executable this crate provisions
pub const TOOL_NAME: &str = "clay";

/// Suffix appended to a shell profile path to form its backup
pub const BACKUP_SUFFIX: &str = ".clay-backup";

/// Every well-known location clay touches on a machine.
#[derive(Debug, Clone)]
pub struct InstallLayout {
    pub tool: String,
    pub home: PathBuf,
    /// `~/.clay`, removed when empty after uninstall
    pub root: PathBuf,
    pub bin_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub config_dir: PathBuf,
    pub stray_paths: Vec<PathBuf>,
}

impl InstallLayout {
    pub fn for_home(home: &Path) -> Self {
        let root = home.join(".clay");
        Self {
            tool: TOOL_NAME.to_string(),
            home: home.to_path_buf(),
            bin_dir: root.join("bin"),
            cache_dir: root.join("content-store"),
            config_dir: home.join(".config").join(TOOL_NAME),
            stray_paths: vec![
                home.join(".local/bin").join(TOOL_NAME),
                home.join(".cargo/bin").join(TOOL_NAME),
                home.join(".cache").join(TOOL_NAME),
                PathBuf::from("/usr/local/bin").join(TOOL_NAME),
                PathBuf::from("/opt").join(TOOL_NAME),
            ],
            root,
        }
    }

    /// Replace the install directory (custom `--install-dir`)
    pub fn with_bin_dir(mut self, bin_dir: PathBuf) -> Self {
        self.bin_dir = bin_dir;
        self
    }

    /// Append extra stray locations, skipping duplicates
    pub fn with_stray_paths(mut self, extra: impl IntoIterator<Item = PathBuf>) -> Self {
        for path in extra {
            if !self.stray_paths.contains(&path) {
                self.stray_paths.push(path);
            }
        }
        self
    }

    pub fn binary(&self) -> PathBuf {
        self.bin_dir.join(&self.tool)
    }

    /// Every startup file an install may have written to
    pub fn shell_profiles(&self) -> Vec<PathBuf> {
        [
            ".bashrc",
            ".bash_profile",
            ".zshrc",
            ".profile",
            ".config/fish/config.fish",
        ]
        .iter()
        .map(|name| self.home.join(name))
        .collect()
    }
}

/// Backup location for a shell profile, e.g. `~/.bashrc.clay-backup`
pub fn backup_path(profile: &Path) -> PathBuf {
    let mut name = profile.as_os_str().to_os_string();
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}
