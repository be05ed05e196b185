use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Extract a `.tar.gz` archive into `dest_dir`
pub fn extract_tar_gz(archive_path: &Path, dest_dir: &Path) -> Result<()> {
    let file = fs::File::open(archive_path)
        .with_context(|| format!("Failed to open {}", archive_path.display()))?;
    tar::Archive::new(flate2::read::GzDecoder::new(file))
        .unpack(dest_dir)
        .with_context(|| format!("Failed to unpack {}", archive_path.display()))
}

/// Find an executable file with the given name anywhere below `dir`
pub fn find_executable(dir: &Path, name: &str) -> Result<Option<PathBuf>> {
    for entry in walkdir::WalkDir::new(dir).follow_links(false) {
        let entry = entry?;
        let path = entry.path();

        if entry.file_type().is_file()
            && path.file_name().and_then(|n| n.to_str()) == Some(name)
            && is_executable(path)?
        {
            return Ok(Some(path.to_path_buf()));
        }
    }

    Ok(None)
}

/// Check if a file is executable
#[cfg(unix)]
pub fn is_executable(path: &Path) -> Result<bool> {
    use std::os::unix::fs::PermissionsExt;
    let metadata = fs::metadata(path)?;
    let permissions = metadata.permissions();
    Ok(permissions.mode() & 0o111 != 0)
}

#[cfg(not(unix))]
pub fn is_executable(path: &Path) -> Result<bool> {
    Ok(path.is_file())
}

/// Make a file executable (Unix only)
#[cfg(unix)]
pub fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut permissions = fs::metadata(path)?.permissions();
    permissions.set_mode(permissions.mode() | 0o111);
    fs::set_permissions(path, permissions)?;
    Ok(())
}

#[cfg(not(unix))]
pub fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

/// Expand a leading `~` against `home`
pub fn expand_tilde(path: &str, home: &Path) -> PathBuf {
    if let Some(rest) = path.strip_prefix('~') {
        let rest = rest.strip_prefix('/').unwrap_or(rest);
        return home.join(rest);
    }
    PathBuf::from(path)
}

/// Remove a file or a directory tree, whichever `path` is
pub fn remove_path(path: &Path) -> std::io::Result<()> {
    let metadata = fs::symlink_metadata(path)?;
    if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}
