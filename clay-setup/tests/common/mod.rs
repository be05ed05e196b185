//! Scripted stand-ins for the network and for external processes.

#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clay_setup::download::{ArtifactFetcher, FetchOutcome};
use clay_setup::env::EnvSnapshot;
use clay_setup::process::{Invocation, ProcessOutcome, ProcessRunner};
use clay_setup::utils;

pub enum FetchBehavior {
    NotFound,
    Archive(Vec<u8>),
}

pub struct FakeFetcher {
    behavior: FetchBehavior,
    pub requested: RefCell<Vec<String>>,
}

impl FakeFetcher {
    pub fn not_found() -> Self {
        Self {
            behavior: FetchBehavior::NotFound,
            requested: RefCell::new(Vec::new()),
        }
    }

    pub fn serving(archive: Vec<u8>) -> Self {
        Self {
            behavior: FetchBehavior::Archive(archive),
            requested: RefCell::new(Vec::new()),
        }
    }
}

impl ArtifactFetcher for FakeFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> FetchOutcome {
        self.requested.borrow_mut().push(url.to_string());
        match &self.behavior {
            FetchBehavior::NotFound => FetchOutcome::Unavailable {
                reason: "server answered 404 Not Found".to_string(),
            },
            FetchBehavior::Archive(bytes) => {
                fs::write(dest, bytes).unwrap();
                FetchOutcome::Downloaded
            }
        }
    }
}

/// Pretends to be git, cargo and the installed binary.
pub struct FakeRunner {
    pub clone_code: Option<i32>,
    pub build_code: Option<i32>,
    pub build_produces_binary: bool,
    pub version_code: Option<i32>,
    pub calls: RefCell<Vec<Invocation>>,
}

impl Default for FakeRunner {
    fn default() -> Self {
        Self {
            clone_code: Some(0),
            build_code: Some(0),
            build_produces_binary: true,
            version_code: Some(0),
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl FakeRunner {
    pub fn programs(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|i| i.program_name()).collect()
    }
}

impl ProcessRunner for FakeRunner {
    fn run(&self, invocation: &Invocation) -> std::io::Result<ProcessOutcome> {
        self.calls.borrow_mut().push(invocation.clone());

        let code = match invocation.program_name().as_str() {
            "git" => {
                if let Some(dest) = invocation.args.last() {
                    fs::create_dir_all(dest)?;
                }
                self.clone_code
            }
            "cargo" => {
                if self.build_code == Some(0) && self.build_produces_binary {
                    let cwd = invocation.cwd.clone().expect("cargo runs in the checkout");
                    let release = cwd.join("target").join("release");
                    fs::create_dir_all(&release)?;
                    write_executable(&release.join("clay"), b"#!/bin/sh\necho clay 0.1.0\n");
                }
                self.build_code
            }
            _ => self.version_code,
        };

        Ok(ProcessOutcome {
            code,
            elapsed: Duration::from_millis(5),
        })
    }
}

pub fn write_executable(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
    utils::make_executable(path).unwrap();
}

/// A directory holding fake `git` and `cargo` executables
pub fn toolchain_dir(root: &Path) -> PathBuf {
    let dir = root.join("toolchain");
    write_executable(&dir.join("git"), b"#!/bin/sh\n");
    write_executable(&dir.join("cargo"), b"#!/bin/sh\n");
    dir
}

pub fn linux_env(home: &Path, path: Vec<PathBuf>) -> EnvSnapshot {
    EnvSnapshot {
        os: "linux".to_string(),
        arch: "x86_64".to_string(),
        home: home.to_path_buf(),
        path,
        shell: Some("/bin/bash".to_string()),
    }
}

/// Gzipped tarball containing an executable `clay` in a versioned folder
pub fn prebuilt_archive(triple: &str) -> Vec<u8> {
    let staging = tempfile::tempdir().unwrap();
    let folder = staging.path().join(format!("clay-{triple}"));
    write_executable(&folder.join("clay"), b"#!/bin/sh\necho clay 0.1.0\n");
    fs::write(folder.join("README.md"), "clay").unwrap();

    let encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder.append_dir_all(".", staging.path()).unwrap();
    builder.into_inner().unwrap().finish().unwrap()
}
