use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Client;
use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::platform::TargetPlatform;

/// Result of a single download attempt. Transport problems are folded into
/// `Unavailable` so the caller only decides whether to fall back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Downloaded,
    Unavailable { reason: String },
}

#[allow(async_fn_in_trait)]
pub trait ArtifactFetcher {
    /// Download `url` into `dest`, overwriting it.
    async fn fetch(&self, url: &str, dest: &Path) -> FetchOutcome;
}

impl<T: ArtifactFetcher> ArtifactFetcher for &T {
    async fn fetch(&self, url: &str, dest: &Path) -> FetchOutcome {
        (**self).fetch(url, dest).await
    }
}

/// URL of the prebuilt archive for `platform`, e.g.
/// `<base>/clay-x86_64-unknown-linux-gnu.tar.gz`
pub fn artifact_url(base: &str, tool: &str, platform: &TargetPlatform) -> String {
    format!(
        "{}/{}-{}.tar.gz",
        base.trim_end_matches('/'),
        tool,
        platform.triple()
    )
}

pub struct HttpFetcher {
    http_client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http_client = Client::builder()
            .user_agent("clay-setup")
            .timeout(timeout)
            .build()?;

        Ok(Self { http_client })
    }

    async fn try_fetch(&self, url: &str, dest: &Path) -> std::result::Result<(), String> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("server answered {status}"));
        }

        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| format!("failed to create {}: {e}", dest.display()))?;

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| format!("failed to read body: {e}"))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| format!("failed to write {}: {e}", dest.display()))?;
        }

        file.flush()
            .await
            .map_err(|e| format!("failed to flush {}: {e}", dest.display()))?;

        Ok(())
    }
}

impl ArtifactFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> FetchOutcome {
        tracing::info!("Downloading {}", url);

        match self.try_fetch(url, dest).await {
            Ok(()) => FetchOutcome::Downloaded,
            Err(reason) => {
                tracing::warn!("Prebuilt download unavailable: {}", reason);
                FetchOutcome::Unavailable { reason }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_url() {
        let platform = TargetPlatform::resolve("darwin", "arm64").unwrap();
        assert_eq!(
            artifact_url("https://example.com/releases/latest/download/", "clay", &platform),
            "https://example.com/releases/latest/download/clay-aarch64-apple-darwin.tar.gz"
        );
    }

    #[tokio::test]
    async fn test_unreachable_host_is_unavailable() {
        let fetcher = HttpFetcher::new(Duration::from_secs(2)).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let outcome = fetcher
            .fetch("http://127.0.0.1:9/clay.tar.gz", &dir.path().join("clay.tar.gz"))
            .await;
        assert!(matches!(outcome, FetchOutcome::Unavailable { .. }));
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_missing_release_is_unavailable() {
        let fetcher = HttpFetcher::new(Duration::from_secs(30)).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let outcome = fetcher
            .fetch(
                "https://github.com/clay-pm/clay/releases/download/v0.0.0-missing/clay.tar.gz",
                &dir.path().join("clay.tar.gz"),
            )
            .await;
        assert!(matches!(outcome, FetchOutcome::Unavailable { .. }));
    }
}
