use std::{path::PathBuf, sync::Arc};

use crate::{
    config::Config,
    errors::{ConvertError, ConvertResult},
    media::{
        Acquirer, MetadataResolver, OutputFormat, YtDlpAcquirer, YtDlpResolver, locate,
        output_template, sanitize::FALLBACK_TITLE, sanitize_title, select_profile,
    },
    utils::is_supported_url,
    workspace::{JobDir, Workspace},
};

/// The produced file. Whoever holds it keeps the workspace from being swept,
/// and dropping it removes the request's job directory.
#[derive(Debug)]
pub struct MediaArtifact {
    pub sanitized_title: String,
    pub expected_filename: String,
    pub expected_path: PathBuf,
    /// Name of the file actually found, may differ from `expected_filename`
    pub filename: String,
    pub path: PathBuf,
    pub format: OutputFormat,
    pub job: JobDir,
}

/// Result of one conversion request. Errors never escape as `Err`.
#[derive(Debug)]
pub enum Outcome {
    Success(MediaArtifact),
    Failure(ConvertError),
}

/// Resolve, sanitize, select, acquire, locate
pub struct Converter {
    resolver: Arc<dyn MetadataResolver>,
    acquirer: Arc<dyn Acquirer>,
    workspace: Workspace,
    verbose: bool,
}

impl Converter {
    pub fn new(
        resolver: Arc<dyn MetadataResolver>,
        acquirer: Arc<dyn Acquirer>,
        workspace: Workspace,
        verbose: bool,
    ) -> Self {
        Self {
            resolver,
            acquirer,
            workspace,
            verbose,
        }
    }

    /// yt-dlp backed converter
    pub fn from_config(config: &Config, workspace: Workspace) -> Self {
        let resolver =
            YtDlpResolver::new(config.ytdlp_path.clone()).with_timeout(Some(config.metadata_timeout));
        let acquirer = YtDlpAcquirer::new(config.ytdlp_path.clone(), config.ffmpeg_path.clone())
            .with_ffmpeg_location(config.ffmpeg_location.clone())
            .with_timeout(config.acquisition_timeout);

        Self::new(Arc::new(resolver), Arc::new(acquirer), workspace, config.verbose)
    }

    pub async fn download(&self, url: &str, format: &str) -> Outcome {
        match self.try_download(url, format).await {
            Ok(artifact) => {
                log::info!("Conversion finished: {}", artifact.path.display());
                Outcome::Success(artifact)
            }
            Err(e) => {
                log::warn!("Conversion of {} as {:?} failed: {}", url, format, e);
                Outcome::Failure(e)
            }
        }
    }

    async fn try_download(&self, url: &str, format: &str) -> ConvertResult<MediaArtifact> {
        let url = url.trim();
        if !is_supported_url(url) {
            return Err(ConvertError::invalid_url(url));
        }

        // Before any process is spawned
        let profile = select_profile(format, self.verbose)?;

        // Any early return drops the job, which removes its directory
        let job = self.workspace.open_job().await?;
        let job_dir = job.path();

        let info = self.resolver.resolve(url).await?;
        let sanitized_title = sanitize_title(info.title.as_deref().unwrap_or(FALLBACK_TITLE));
        let expected_filename = profile.filename(&sanitized_title);
        let expected_path = job_dir.join(&expected_filename);

        self.acquirer
            .acquire(url, &profile, &output_template(job_dir, &sanitized_title))
            .await?;

        let found = locate(
            &expected_path,
            job_dir,
            &sanitized_title,
            profile.accepted_extensions(),
        )
        .await?;

        Ok(MediaArtifact {
            sanitized_title,
            expected_filename,
            expected_path,
            filename: found.filename,
            path: found.path,
            format: profile.format,
            job,
        })
    }
}
