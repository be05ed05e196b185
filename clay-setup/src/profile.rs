//! Shell startup file editing.
//!
//! Install appends a two-line block (a marker comment and a PATH statement)
//! to one profile. Uninstall removes that block from every known profile,
//! always writing `<profile>.clay-backup` first.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::env::{EnvSnapshot, ShellFamily};
use crate::layout::backup_path;

/// Comment line that anchors the block we own
pub const MARKER: &str = "# clay";

#[derive(Debug, Clone)]
pub struct ShellProfile {
    pub path: PathBuf,
    pub exists: bool,
    pub raw_content: String,
    pub has_install_dir_entry: bool,
}

impl ShellProfile {
    /// Read a profile; a missing file is an empty, non-existent profile
    pub fn load(path: &Path, install_dir: &Path) -> io::Result<Self> {
        let (exists, raw_content) = match fs::read_to_string(path) {
            Ok(content) => (true, content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => (false, String::new()),
            Err(e) => return Err(e),
        };

        let has_install_dir_entry = raw_content.contains(&*install_dir.to_string_lossy());

        Ok(Self {
            path: path.to_path_buf(),
            exists,
            raw_content,
            has_install_dir_entry,
        })
    }

    fn has_marker(&self) -> bool {
        self.raw_content.lines().any(|l| l.trim() == MARKER)
    }
}

/// Startup files probed for a shell family, most specific first
pub fn candidates(family: ShellFamily, home: &Path) -> Vec<PathBuf> {
    match family {
        ShellFamily::Zsh => vec![home.join(".zshrc")],
        ShellFamily::Bash => vec![home.join(".bashrc"), home.join(".bash_profile")],
        ShellFamily::Fish => vec![home.join(".config/fish/config.fish")],
        ShellFamily::Posix => vec![home.join(".profile")],
    }
}

/// The line that puts `install_dir` in front of `PATH`
pub fn path_statement(family: ShellFamily, install_dir: &Path) -> String {
    match family {
        ShellFamily::Fish => format!("set -gx PATH \"{}\" $PATH", install_dir.display()),
        _ => format!("export PATH=\"{}:$PATH\"", install_dir.display()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathUpdate {
    /// The current session already resolves the install dir
    AlreadyOnPath,
    AlreadyPresent(PathBuf),
    Appended(PathBuf),
    /// None of the family's startup files exist; `line` is what to add by hand
    NoProfile { line: String },
    Declined(PathBuf),
}

/// Make `install_dir` visible on future shells' search path, at most once.
pub fn add_to_path(
    env: &EnvSnapshot,
    install_dir: &Path,
    decide: &mut dyn FnMut(&str) -> bool,
) -> Result<PathUpdate> {
    if env.path_contains(install_dir) {
        tracing::info!("{} is already on PATH", install_dir.display());
        return Ok(PathUpdate::AlreadyOnPath);
    }

    let family = env.shell_family();
    let statement = path_statement(family, install_dir);

    let Some(chosen) = candidates(family, &env.home)
        .into_iter()
        .find(|p| p.is_file())
    else {
        tracing::warn!(
            "No startup file found for {:?}; add this line manually: {}",
            family,
            statement
        );
        return Ok(PathUpdate::NoProfile { line: statement });
    };

    let profile = ShellProfile::load(&chosen, install_dir)
        .with_context(|| format!("Failed to read {}", chosen.display()))?;

    if profile.has_install_dir_entry {
        tracing::info!("{} already references {}", chosen.display(), install_dir.display());
        return Ok(PathUpdate::AlreadyPresent(chosen));
    }

    if !decide(&format!(
        "Add {} to PATH in {}?",
        install_dir.display(),
        chosen.display()
    )) {
        return Ok(PathUpdate::Declined(chosen));
    }

    let mut block = String::new();
    if !profile.raw_content.is_empty() {
        if !profile.raw_content.ends_with('\n') {
            block.push('\n');
        }
        block.push('\n');
    }
    block.push_str(MARKER);
    block.push('\n');
    block.push_str(&statement);
    block.push('\n');

    let mut file = fs::OpenOptions::new()
        .append(true)
        .open(&chosen)
        .with_context(|| format!("Failed to open {}", chosen.display()))?;
    file.write_all(block.as_bytes())
        .with_context(|| format!("Failed to update {}", chosen.display()))?;

    tracing::info!("Added {} to PATH in {}", install_dir.display(), chosen.display());
    Ok(PathUpdate::Appended(chosen))
}

fn is_path_statement(line: &str) -> bool {
    let line = line.trim_start();
    line.starts_with("export PATH=") || line.starts_with("set -gx PATH ")
}

/// Delete every marker line together with the PATH statement that follows
/// it, whatever directory that statement names. A blank line directly above
/// the marker goes too, since install writes one as a separator.
///
/// Returns `None` when no well-formed block is present.
pub fn remove_marker_block(content: &str) -> Option<String> {
    let lines: Vec<&str> = content.lines().collect();
    let mut kept: Vec<&str> = Vec::with_capacity(lines.len());
    let mut removed = false;
    let mut i = 0;

    while i < lines.len() {
        let is_block = lines[i].trim() == MARKER
            && lines.get(i + 1).is_some_and(|next| is_path_statement(next));
        if is_block {
            if kept.last().is_some_and(|prev| prev.trim().is_empty()) {
                kept.pop();
            }
            removed = true;
            i += 2;
            continue;
        }
        kept.push(lines[i]);
        i += 1;
    }

    if !removed {
        return None;
    }

    let mut out = kept.join("\n");
    if content.ends_with('\n') && !out.is_empty() {
        out.push('\n');
    }
    Some(out)
}

/// Drop every line mentioning `tool`. Coarse: unrelated lines that happen to
/// contain the name go too.
pub fn filter_tool_lines(content: &str, tool: &str) -> (String, Vec<String>) {
    let mut dropped = Vec::new();
    let mut kept = Vec::new();
    for line in content.lines() {
        if line.contains(tool) {
            dropped.push(line.to_string());
        } else {
            kept.push(line);
        }
    }

    let mut out = kept.join("\n");
    if content.ends_with('\n') && !out.is_empty() {
        out.push('\n');
    }
    (out, dropped)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileCleanup {
    Missing,
    /// No marker and no reference to the install dir
    Clean,
    Removed { backup: PathBuf },
    FuzzyRemoved { backup: PathBuf, dropped: Vec<String> },
    /// Entries exist but no marker block was found and fuzzy cleanup is off
    LeftInPlace,
    Declined,
}

/// Remove our PATH entries from one profile.
pub fn remove_from_profile(
    path: &Path,
    install_dir: &Path,
    tool: &str,
    fuzzy: bool,
    decide: &mut dyn FnMut(&str) -> bool,
) -> Result<ProfileCleanup> {
    let profile = ShellProfile::load(path, install_dir)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    if !profile.exists {
        return Ok(ProfileCleanup::Missing);
    }
    if !profile.has_install_dir_entry && !profile.has_marker() {
        return Ok(ProfileCleanup::Clean);
    }

    if !decide(&format!("Remove clay PATH entries from {}?", path.display())) {
        return Ok(ProfileCleanup::Declined);
    }

    let dir = install_dir.to_string_lossy();
    let after_block = remove_marker_block(&profile.raw_content);
    let residue = after_block
        .as_deref()
        .unwrap_or(&profile.raw_content)
        .contains(&*dir);

    let (new_content, dropped) = match after_block {
        Some(content) if !residue => (content, None),
        _ if fuzzy => {
            let (filtered, dropped) = filter_tool_lines(&profile.raw_content, tool);
            for line in &dropped {
                tracing::warn!("Dropping line from {}: {}", path.display(), line);
            }
            (filtered, Some(dropped))
        }
        Some(content) => {
            tracing::warn!(
                "{} still references {} outside the '{}' block; rerun with --fuzzy-path-cleanup to drop every line mentioning {}",
                path.display(),
                install_dir.display(),
                MARKER,
                tool
            );
            (content, None)
        }
        None => {
            tracing::warn!(
                "No '{}' block found in {}; rerun with --fuzzy-path-cleanup to drop every line mentioning {}",
                MARKER,
                path.display(),
                tool
            );
            return Ok(ProfileCleanup::LeftInPlace);
        }
    };

    let backup = backup_path(path);
    fs::copy(path, &backup)
        .with_context(|| format!("Failed to back up {} to {}", path.display(), backup.display()))?;
    fs::write(path, new_content).with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!("Cleaned {} (backup at {})", path.display(), backup.display());

    Ok(match dropped {
        Some(dropped) => ProfileCleanup::FuzzyRemoved { backup, dropped },
        None => ProfileCleanup::Removed { backup },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, TempDir};

    fn env_for(home: &Path, shell: &str, path: Vec<PathBuf>) -> EnvSnapshot {
        EnvSnapshot {
            os: "linux".to_string(),
            arch: "x86_64".to_string(),
            home: home.to_path_buf(),
            path,
            shell: Some(shell.to_string()),
        }
    }

    fn yes() -> impl FnMut(&str) -> bool {
        |_: &str| true
    }

    fn setup() -> (TempDir, PathBuf) {
        let home = tempdir().unwrap();
        let install_dir = home.path().join(".clay").join("bin");
        (home, install_dir)
    }

    #[test]
    fn test_append_is_idempotent() {
        let (home, install_dir) = setup();
        let zshrc = home.path().join(".zshrc");
        fs::write(&zshrc, "alias ll='ls -l'").unwrap();
        let env = env_for(home.path(), "/bin/zsh", vec![PathBuf::from("/usr/bin")]);

        let first = add_to_path(&env, &install_dir, &mut yes()).unwrap();
        assert_eq!(first, PathUpdate::Appended(zshrc.clone()));
        let after_first = fs::read(&zshrc).unwrap();
        let text = String::from_utf8(after_first.clone()).unwrap();
        assert_eq!(
            text,
            format!(
                "alias ll='ls -l'\n\n# clay\nexport PATH=\"{}:$PATH\"\n",
                install_dir.display()
            )
        );

        let second = add_to_path(&env, &install_dir, &mut yes()).unwrap();
        assert_eq!(second, PathUpdate::AlreadyPresent(zshrc.clone()));
        assert_eq!(fs::read(&zshrc).unwrap(), after_first);
    }

    #[test]
    fn test_skip_when_already_on_path() {
        let (home, install_dir) = setup();
        let zshrc = home.path().join(".zshrc");
        fs::write(&zshrc, "").unwrap();
        let env = env_for(home.path(), "zsh", vec![install_dir.clone()]);

        let mut asked = false;
        let mut decide = |_: &str| {
            asked = true;
            true
        };
        let update = add_to_path(&env, &install_dir, &mut decide).unwrap();
        assert_eq!(update, PathUpdate::AlreadyOnPath);
        assert!(!asked);
        assert_eq!(fs::read_to_string(&zshrc).unwrap(), "");
    }

    #[test]
    fn test_bash_falls_back_to_bash_profile() {
        let (home, install_dir) = setup();
        let bash_profile = home.path().join(".bash_profile");
        fs::write(&bash_profile, "export EDITOR=vim\n").unwrap();
        let env = env_for(home.path(), "/bin/bash", vec![]);

        let update = add_to_path(&env, &install_dir, &mut yes()).unwrap();
        assert_eq!(update, PathUpdate::Appended(bash_profile.clone()));
        let content = fs::read_to_string(&bash_profile).unwrap();
        assert!(content.starts_with("export EDITOR=vim\n\n# clay\n"));
    }

    #[test]
    fn test_fish_statement() {
        let (home, install_dir) = setup();
        let config = home.path().join(".config/fish/config.fish");
        fs::create_dir_all(config.parent().unwrap()).unwrap();
        fs::write(&config, "").unwrap();
        let env = env_for(home.path(), "/usr/bin/fish", vec![]);

        add_to_path(&env, &install_dir, &mut yes()).unwrap();
        assert_eq!(
            fs::read_to_string(&config).unwrap(),
            format!("# clay\nset -gx PATH \"{}\" $PATH\n", install_dir.display())
        );
    }

    #[test]
    fn test_missing_profile_is_skipped() {
        let (home, install_dir) = setup();
        let env = env_for(home.path(), "/bin/zsh", vec![]);

        let update = add_to_path(&env, &install_dir, &mut yes()).unwrap();
        assert!(matches!(update, PathUpdate::NoProfile { ref line } if line.contains("export PATH")));
        assert!(!home.path().join(".zshrc").exists());
    }

    #[test]
    fn test_declined_leaves_profile() {
        let (home, install_dir) = setup();
        let profile = home.path().join(".profile");
        fs::write(&profile, "umask 022\n").unwrap();
        let env = env_for(home.path(), "/bin/sh", vec![]);

        let update = add_to_path(&env, &install_dir, &mut |_: &str| false).unwrap();
        assert_eq!(update, PathUpdate::Declined(profile.clone()));
        assert_eq!(fs::read_to_string(&profile).unwrap(), "umask 022\n");
    }

    #[test]
    fn test_remove_marker_block() {
        let content = "a\n# clay\nexport PATH=\"/home/u/.clay/bin:$PATH\"\nb\n";
        assert_eq!(remove_marker_block(content).unwrap(), "a\nb\n");

        let fish = "# clay\nset -gx PATH \"/opt/clay\" $PATH\n";
        assert_eq!(remove_marker_block(fish).unwrap(), "");

        let malformed = "a\n# clay\nb\n";
        assert!(remove_marker_block(malformed).is_none());
        assert!(remove_marker_block("a\nb\n").is_none());
    }

    #[test]
    fn test_marker_block_for_other_install_dir_is_removed() {
        let content = "export A=1\n\n# clay\nexport PATH=\"/srv/tools:$PATH\"\n";
        assert_eq!(remove_marker_block(content).unwrap(), "export A=1\n");
    }

    #[test]
    fn test_append_then_remove_restores_profile() {
        let (home, install_dir) = setup();
        let bashrc = home.path().join(".bashrc");
        fs::write(&bashrc, "export A=1\n").unwrap();
        let env = env_for(home.path(), "/bin/bash", vec![]);

        add_to_path(&env, &install_dir, &mut yes()).unwrap();
        let cleanup =
            remove_from_profile(&bashrc, &install_dir, "clay", false, &mut yes()).unwrap();

        assert!(matches!(cleanup, ProfileCleanup::Removed { .. }));
        assert_eq!(fs::read_to_string(&bashrc).unwrap(), "export A=1\n");
    }

    #[test]
    fn test_filter_tool_lines() {
        let (out, dropped) = filter_tool_lines("a\nalias c=clay\nb\n", "clay");
        assert_eq!(out, "a\nb\n");
        assert_eq!(dropped, vec!["alias c=clay".to_string()]);
    }

    #[test]
    fn test_remove_writes_backup_first() {
        let (home, install_dir) = setup();
        let bashrc = home.path().join(".bashrc");
        let original = format!(
            "export A=1\n\n# clay\nexport PATH=\"{}:$PATH\"\nexport B=2\n",
            install_dir.display()
        );
        fs::write(&bashrc, &original).unwrap();

        let cleanup =
            remove_from_profile(&bashrc, &install_dir, "clay", false, &mut yes()).unwrap();

        let backup = home.path().join(".bashrc.clay-backup");
        assert_eq!(cleanup, ProfileCleanup::Removed { backup: backup.clone() });
        assert_eq!(fs::read_to_string(&backup).unwrap(), original);
        assert_eq!(fs::read_to_string(&bashrc).unwrap(), "export A=1\nexport B=2\n");

        // Second pass finds nothing and keeps the backup untouched
        let again = remove_from_profile(&bashrc, &install_dir, "clay", false, &mut yes()).unwrap();
        assert_eq!(again, ProfileCleanup::Clean);
        assert_eq!(fs::read_to_string(&backup).unwrap(), original);
    }

    #[test]
    fn test_remove_missing_profile() {
        let (home, install_dir) = setup();
        let cleanup = remove_from_profile(
            &home.path().join(".zshrc"),
            &install_dir,
            "clay",
            true,
            &mut yes(),
        )
        .unwrap();
        assert_eq!(cleanup, ProfileCleanup::Missing);
    }

    #[test]
    fn test_unmarked_entry_needs_fuzzy_opt_in() {
        let (home, install_dir) = setup();
        let zshrc = home.path().join(".zshrc");
        let original = format!(
            "path+=({})\nalias c=clay\nexport X=1\n",
            install_dir.display()
        );
        fs::write(&zshrc, &original).unwrap();

        let left = remove_from_profile(&zshrc, &install_dir, "clay", false, &mut yes()).unwrap();
        assert_eq!(left, ProfileCleanup::LeftInPlace);
        assert_eq!(fs::read_to_string(&zshrc).unwrap(), original);
        assert!(!home.path().join(".zshrc.clay-backup").exists());

        let fuzzy = remove_from_profile(&zshrc, &install_dir, "clay", true, &mut yes()).unwrap();
        match fuzzy {
            ProfileCleanup::FuzzyRemoved { backup, dropped } => {
                assert_eq!(fs::read_to_string(backup).unwrap(), original);
                assert_eq!(dropped.len(), 2);
            }
            other => panic!("unexpected cleanup: {other:?}"),
        }
        assert_eq!(fs::read_to_string(&zshrc).unwrap(), "export X=1\n");
    }

    #[test]
    fn test_remove_declined() {
        let (home, install_dir) = setup();
        let zshrc = home.path().join(".zshrc");
        let original = format!("# clay\nexport PATH=\"{}:$PATH\"\n", install_dir.display());
        fs::write(&zshrc, &original).unwrap();

        let cleanup =
            remove_from_profile(&zshrc, &install_dir, "clay", false, &mut |_: &str| false).unwrap();
        assert_eq!(cleanup, ProfileCleanup::Declined);
        assert_eq!(fs::read_to_string(&zshrc).unwrap(), original);
    }
}
