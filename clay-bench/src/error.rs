use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BenchError {
    #[error("{tool} executable not found at {}", path.display())]
    ToolNotFound { tool: String, path: PathBuf },

    #[error("Failed to start {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} install failed in scenario {scenario} (run {run}, exit code {code:?})")]
    TrialFailed {
        scenario: String,
        tool: String,
        run: usize,
        code: Option<i32>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BenchError>;
