use std::{
    io,
    path::{Path, PathBuf},
    process::{Output, Stdio},
    time::Duration,
};

use async_trait::async_trait;
use tokio::process;

use crate::errors::{ConvertError, ConvertResult};
use crate::media::profile::AcquisitionProfile;

/// Lowercased fragments yt-dlp prints when it cannot find ffmpeg
const MISSING_FFMPEG_SIGNATURES: [&str; 4] = [
    "ffmpeg not found",
    "ffmpeg is not installed",
    "no ffmpeg",
    "ffprobe and ffmpeg not found",
];

/// Fetches and transcodes one URL into the output template
#[async_trait]
pub trait Acquirer: Send + Sync {
    async fn acquire(
        &self,
        url: &str,
        profile: &AcquisitionProfile,
        output_template: &Path,
    ) -> ConvertResult<()>;
}

pub struct YtDlpAcquirer {
    ytdlp_path: String,
    ffmpeg_path: String,
    ffmpeg_location: Option<String>,
    timeout: Option<Duration>,
}

impl YtDlpAcquirer {
    pub fn new(ytdlp_path: impl Into<String>, ffmpeg_path: impl Into<String>) -> Self {
        Self {
            ytdlp_path: ytdlp_path.into(),
            ffmpeg_path: ffmpeg_path.into(),
            ffmpeg_location: None,
            timeout: None,
        }
    }

    pub fn with_ffmpeg_location(mut self, location: Option<String>) -> Self {
        self.ffmpeg_location = location;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn build_command(
        &self,
        url: &str,
        profile: &AcquisitionProfile,
        output_template: &Path,
    ) -> process::Command {
        let mut cmd = process::Command::new(&self.ytdlp_path);
        cmd.arg("--no-playlist")
            .args(["--socket-timeout", "5", "--retries", "3"])
            .arg("--no-progress")
            .args(["-f", profile.stream_selection])
            .arg("-o")
            .arg(output_template);

        if let Some(container) = profile.merge_container {
            cmd.args(["--merge-output-format", container]);
        }

        if let Some(post) = &profile.post_processing {
            cmd.args(["-x", "--audio-format", post.codec])
                .args(["--audio-quality", &format!("{}K", post.quality_kbps)]);
        }

        if let Some(location) = &self.ffmpeg_location {
            cmd.args(["--ffmpeg-location", location]);
        }

        if !profile.verbose {
            cmd.args(["--quiet", "--no-warnings"]);
        }

        cmd.arg(url);
        cmd
    }

    /// Structured check: a spawn failing with `NotFound` means ffmpeg is absent.
    /// Anything else is inconclusive and left to the stderr check after the run.
    async fn probe_transcoder(&self) -> ConvertResult<()> {
        let status = process::Command::new(&self.ffmpeg_path)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match status {
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::error!("Transcoder not found at {}", self.ffmpeg_path);
                Err(ConvertError::missing_transcoder("ffmpeg"))
            }
            Err(e) => {
                log::warn!("Could not probe {}: {}", self.ffmpeg_path, e);
                Ok(())
            }
            Ok(_) => Ok(()),
        }
    }
}

#[async_trait]
impl Acquirer for YtDlpAcquirer {
    async fn acquire(
        &self,
        url: &str,
        profile: &AcquisitionProfile,
        output_template: &Path,
    ) -> ConvertResult<()> {
        if profile.needs_transcoder() {
            self.probe_transcoder().await?;
        }

        let mut cmd = self.build_command(url, profile, output_template);
        cmd.stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        log::info!(
            "Starting download: {} (format: {}, template: {})",
            url,
            profile.format,
            output_template.display()
        );

        let child = cmd
            .spawn()
            .map_err(|e| ConvertError::acquisition(spawn_error(&self.ytdlp_path, &e)))?;

        let output = wait_with_deadline(child, self.timeout).await.map_err(|msg| {
            log::error!("yt-dlp did not finish for {}: {}", url, msg);
            ConvertError::acquisition(msg)
        })?;

        log::info!("yt-dlp exit code: {:?}", output.status.code());

        if output.status.success() {
            log::debug!("yt-dlp output: {}", String::from_utf8_lossy(&output.stdout));
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            log::error!("yt-dlp failed: {}", stderr.trim());
            Err(classify_failure(&stderr))
        }
    }
}

/// Pattern fallback for when the probe could not tell that ffmpeg is unusable
fn classify_failure(stderr: &str) -> ConvertError {
    let lower = stderr.to_ascii_lowercase();
    if MISSING_FFMPEG_SIGNATURES.iter().any(|sig| lower.contains(sig)) {
        ConvertError::missing_transcoder("ffmpeg")
    } else {
        ConvertError::acquisition(last_error_line(stderr))
    }
}

/// `{dir}/{title}.%(ext)s`, so yt-dlp fills in the extension
pub fn output_template(dir: &Path, sanitized_title: &str) -> PathBuf {
    dir.join(format!("{}.%(ext)s", sanitized_title))
}

/// Waits for a child spawned with `kill_on_drop`. Dropping the pending wait on
/// expiry drops the child, which kills it.
pub(crate) async fn wait_with_deadline(
    child: process::Child,
    limit: Option<Duration>,
) -> Result<Output, String> {
    let waited = match limit {
        Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
            .await
            .map_err(|_| format!("timed out after {:?}", limit))?,
        None => child.wait_with_output().await,
    };
    waited.map_err(|e| format!("lost track of the yt-dlp process: {}", e))
}

/// yt-dlp logs a lot; the useful part is its final `ERROR:` line
pub(crate) fn last_error_line(stderr: &str) -> String {
    stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .next_back()
        .map(|line| line.trim_start_matches("ERROR:").trim().to_string())
        .unwrap_or_else(|| "yt-dlp exited without an error message".to_string())
}

pub(crate) fn spawn_error(tool: &str, err: &io::Error) -> String {
    if err.kind() == io::ErrorKind::NotFound {
        format!("{} is not installed or not on PATH", tool)
    } else {
        format!("failed to run {}: {}", tool, err)
    }
}
