use thiserror::Error;

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported operating system '{os}'. clay provides builds for Linux and macOS only")]
    UnsupportedOs { os: String },

    #[error("Unsupported architecture '{arch}'. clay provides builds for x86_64 and aarch64 only")]
    UnsupportedArch { arch: String },

    #[error("No prebuilt clay is available and '{tool}' is required to build from source. Install it from {hint}")]
    MissingToolchain { tool: String, hint: String },

    #[error("Failed to clone {repository} (exit code: {code:?})")]
    CloneFailed {
        repository: String,
        code: Option<i32>,
    },

    #[error("Release build failed in {path} (exit code: {code:?})")]
    BuildFailed { path: String, code: Option<i32> },

    #[error("Build finished but no binary was produced at {path}")]
    BuiltBinaryNotFound { path: String },

    #[error("Prebuilt binary for {target} is unavailable and source fallback is disabled")]
    PrebuiltUnavailable { target: String },

    #[error("Verification of {path} failed: {reason}")]
    Verification { path: String, reason: String },

    #[error("Could not determine the home directory")]
    NoHomeDirectory,
}

pub type Result<T> = std::result::Result<T, SetupError>;
