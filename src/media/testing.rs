//! Stand-ins for yt-dlp used by unit tests.

use std::{
    path::Path,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;

use crate::errors::{ConvertError, ConvertResult};
use crate::media::{
    Acquirer, MetadataResolver, info::VideoInfo, profile::AcquisitionProfile,
};

/// Always answers with the same title
pub struct FixedTitle(pub Option<&'static str>);

#[async_trait]
impl MetadataResolver for FixedTitle {
    async fn resolve(&self, _url: &str) -> ConvertResult<VideoInfo> {
        Ok(VideoInfo {
            title: self.0.map(str::to_string),
            ..VideoInfo::default()
        })
    }
}

/// Fails the test if metadata is ever requested
pub struct PanickingResolver;

#[async_trait]
impl MetadataResolver for PanickingResolver {
    async fn resolve(&self, url: &str) -> ConvertResult<VideoInfo> {
        panic!("resolver must not be called for {}", url);
    }
}

pub struct FailingResolver;

#[async_trait]
impl MetadataResolver for FailingResolver {
    async fn resolve(&self, _url: &str) -> ConvertResult<VideoInfo> {
        Err(ConvertError::extraction("Unsupported URL"))
    }
}

/// Writes the template with `write_ext` filled in, or reports success without writing anything
pub struct FakeAcquirer {
    write_ext: Option<&'static str>,
    calls: AtomicUsize,
    seen_profiles: Mutex<Vec<AcquisitionProfile>>,
}

impl FakeAcquirer {
    pub fn writing(ext: Option<&'static str>) -> Arc<Self> {
        Arc::new(Self {
            write_ext: ext,
            calls: AtomicUsize::new(0),
            seen_profiles: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen_profiles(&self) -> Vec<AcquisitionProfile> {
        self.seen_profiles.lock().unwrap().clone()
    }
}

#[async_trait]
impl Acquirer for FakeAcquirer {
    async fn acquire(
        &self,
        _url: &str,
        profile: &AcquisitionProfile,
        output_template: &Path,
    ) -> ConvertResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_profiles.lock().unwrap().push(profile.clone());
        if let Some(ext) = self.write_ext {
            let path = output_template.to_string_lossy().replace("%(ext)s", ext);
            std::fs::write(path, b"media")?;
        }
        Ok(())
    }
}

pub struct MissingFfmpeg;

#[async_trait]
impl Acquirer for MissingFfmpeg {
    async fn acquire(&self, _: &str, _: &AcquisitionProfile, _: &Path) -> ConvertResult<()> {
        Err(ConvertError::missing_transcoder("ffmpeg"))
    }
}

/// Writes an executable shell script standing in for yt-dlp or ffmpeg
#[cfg(unix)]
pub fn install_stub(dir: &Path, name: &str, script: &str) -> String {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path.to_string_lossy().into_owned()
}

/// Job directories are removed by a spawned task, so give it a moment.
/// Returns how many entries are still in `dir` after waiting.
pub async fn entries_after_cleanup(dir: &Path) -> usize {
    let count = || std::fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0);
    for _ in 0..100 {
        if count() == 0 {
            return 0;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    count()
}
