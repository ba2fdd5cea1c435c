use std::{process::Stdio, time::Duration};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

use crate::errors::{ConvertError, ConvertResult};
use crate::media::youtube::{last_error_line, spawn_error, wait_with_deadline};

/// Remote metadata needed before anything is downloaded
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VideoInfo {
    pub title: Option<String>,
    pub id: Option<String>,
    pub extractor: Option<String>,
}

/// Fetches metadata for a URL without downloading the media payload
#[async_trait]
pub trait MetadataResolver: Send + Sync {
    async fn resolve(&self, url: &str) -> ConvertResult<VideoInfo>;
}

/// Asks yt-dlp for the single-video JSON description
pub struct YtDlpResolver {
    ytdlp_path: String,
    timeout: Option<Duration>,
}

impl YtDlpResolver {
    pub fn new(ytdlp_path: impl Into<String>) -> Self {
        Self {
            ytdlp_path: ytdlp_path.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl MetadataResolver for YtDlpResolver {
    async fn resolve(&self, url: &str) -> ConvertResult<VideoInfo> {
        let child = Command::new(&self.ytdlp_path)
            .arg("--no-playlist")
            .args(["--socket-timeout", "5", "--retries", "3"])
            .args(["--skip-download", "--dump-single-json"])
            .arg(url)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ConvertError::extraction(spawn_error(&self.ytdlp_path, &e)))?;

        let output = wait_with_deadline(child, self.timeout).await.map_err(|msg| {
            log::error!("yt-dlp metadata fetch did not finish for {}: {}", url, msg);
            ConvertError::extraction(msg)
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            log::error!("yt-dlp metadata fetch failed for {}: {}", url, stderr.trim());
            return Err(ConvertError::extraction(last_error_line(&stderr)));
        }

        parse_info(&output.stdout)
    }
}

fn parse_info(stdout: &[u8]) -> ConvertResult<VideoInfo> {
    let info: VideoInfo = serde_json::from_slice(stdout)?;
    log::info!(
        "Resolved metadata: id={:?} extractor={:?} title={:?}",
        info.id,
        info.extractor,
        info.title
    );
    Ok(info)
}
