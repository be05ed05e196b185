use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::utils;

/// What is on disk at the binary path right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationState {
    pub binary_path: PathBuf,
    pub exists: bool,
    pub executable: bool,
}

impl InstallationState {
    /// Read the state fresh from the filesystem
    pub fn probe(binary_path: &Path) -> Self {
        let exists = binary_path.is_file();
        let executable = exists && utils::is_executable(binary_path).unwrap_or(false);
        Self {
            binary_path: binary_path.to_path_buf(),
            exists,
            executable,
        }
    }

    pub fn is_installed(&self) -> bool {
        self.exists && self.executable
    }
}

/// Create `dir` if needed; an existing directory is fine.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create install directory {}", dir.display()))
}

/// Place `source` at `install_dir/name`, replacing whatever is there.
///
/// The binary is staged next to its destination and renamed over it so a
/// reader never sees a half-written file.
pub fn place_binary(source: &Path, install_dir: &Path, name: &str) -> Result<InstallationState> {
    ensure_dir(install_dir)?;

    let dest_path = install_dir.join(name);
    let staged = install_dir.join(format!(".{name}.partial"));

    tracing::info!("Installing {} to {}", name, dest_path.display());

    fs::copy(source, &staged)
        .with_context(|| format!("Failed to copy {} to {}", source.display(), staged.display()))?;
    utils::make_executable(&staged)?;

    if let Err(e) = fs::rename(&staged, &dest_path) {
        let _ = fs::remove_file(&staged);
        return Err(e).with_context(|| format!("Failed to replace {}", dest_path.display()));
    }

    Ok(InstallationState::probe(&dest_path))
}
