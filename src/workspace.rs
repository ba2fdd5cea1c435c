use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use tokio::{
    fs,
    sync::{OwnedRwLockReadGuard, RwLock},
    task::JoinHandle,
};

/// Held while an acquisition or a file transfer is in flight. Blocks [`Workspace::sweep`]
pub type Lease = OwnedRwLockReadGuard<()>;

/// The temp directory every request writes into
#[derive(Clone)]
pub struct Workspace {
    root: PathBuf,
    gate: Arc<RwLock<()>>,
}

impl Workspace {
    pub async fn create(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        Ok(Self {
            root,
            gate: Arc::new(RwLock::new(())),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Leases the workspace and creates a fresh directory for a single request,
    /// so equal titles never collide
    pub async fn open_job(&self) -> io::Result<JobDir> {
        let lease = self.lease().await;
        let path = self.root.join(uuid::Uuid::new_v4().to_string());
        fs::create_dir_all(&path).await?;
        Ok(JobDir {
            path,
            lease: Some(lease),
        })
    }

    async fn lease(&self) -> Lease {
        self.gate.clone().read_owned().await
    }

    /// Empties the workspace once no lease is held. Returns the number of removed entries.
    pub async fn sweep(&self) -> io::Result<usize> {
        let _exclusive = self.gate.write().await;
        clear_dir(&self.root).await
    }

    pub fn spawn_periodic_sweep(&self, every: Duration) -> JoinHandle<()> {
        let workspace = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            // the first tick completes immediately; startup already swept
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match workspace.sweep().await {
                    Ok(0) => {}
                    Ok(removed) => log::info!("Periodic sweep removed {} entries", removed),
                    Err(e) => log::error!("Periodic sweep failed: {}", e),
                }
            }
        })
    }
}

/// One request's directory. Removed together with its contents when dropped;
/// the lease is released only after the removal finished.
#[derive(Debug)]
pub struct JobDir {
    path: PathBuf,
    lease: Option<Lease>,
}

impl JobDir {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for JobDir {
    fn drop(&mut self) {
        let path = std::mem::take(&mut self.path);
        let lease = self.lease.take();

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    log_removal(&path, fs::remove_dir_all(&path).await);
                    drop(lease);
                });
            }
            Err(_) => log_removal(&path, std::fs::remove_dir_all(&path)),
        }
    }
}

fn log_removal(path: &Path, result: io::Result<()>) {
    match result {
        Ok(()) => log::debug!("Removed job directory {}", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => log::error!("Error removing job directory {}: {}", path.display(), e),
    }
}

/// Removes everything inside `dir`, keeping `dir` itself. Per-entry failures are logged and skipped.
pub async fn clear_dir(dir: &Path) -> io::Result<usize> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };

    let mut removed = 0;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let result = match entry.file_type().await {
            Ok(kind) if kind.is_dir() => fs::remove_dir_all(&path).await,
            Ok(_) => fs::remove_file(&path).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => removed += 1,
            Err(e) => log::error!("Error during cleanup of {}: {}", path.display(), e),
        }
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::testing::entries_after_cleanup;

    #[tokio::test]
    async fn job_dirs_are_unique_and_inside_the_root() {
        let temp = tempfile::tempdir().unwrap();
        let workspace = Workspace::create(temp.path().join("downloads")).await.unwrap();

        let a = workspace.open_job().await.unwrap();
        let b = workspace.open_job().await.unwrap();
        assert_ne!(a.path(), b.path());
        assert!(a.path().starts_with(workspace.root()) && a.path().is_dir());
    }

    #[tokio::test]
    async fn dropped_job_dir_is_removed_with_its_contents() {
        let temp = tempfile::tempdir().unwrap();
        let workspace = Workspace::create(temp.path()).await.unwrap();
        let job = workspace.open_job().await.unwrap();
        std::fs::write(job.path().join("clip.mp4"), b"video").unwrap();
        let path = job.path().to_path_buf();

        drop(job);
        assert_eq!(entries_after_cleanup(workspace.root()).await, 0);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn sweep_removes_files_and_directories_but_keeps_root() {
        let temp = tempfile::tempdir().unwrap();
        let workspace = Workspace::create(temp.path()).await.unwrap();
        std::fs::create_dir(temp.path().join("leftover-job")).unwrap();
        std::fs::write(temp.path().join("leftover-job").join("clip.mp4"), b"video").unwrap();
        std::fs::write(temp.path().join("stray.mp3"), b"audio").unwrap();

        assert_eq!(workspace.sweep().await.unwrap(), 2);
        assert!(temp.path().is_dir());
        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn sweep_waits_for_outstanding_leases() {
        let temp = tempfile::tempdir().unwrap();
        let workspace = Workspace::create(temp.path()).await.unwrap();
        let job = workspace.open_job().await.unwrap();
        std::fs::write(job.path().join("clip.mp4"), b"video").unwrap();

        let sweeper = workspace.clone();
        let sweep = tokio::spawn(async move { sweeper.sweep().await });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!sweep.is_finished());
        assert!(job.path().join("clip.mp4").exists());

        drop(job);
        sweep.await.unwrap().unwrap();
        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn clearing_a_missing_dir_is_a_noop() {
        let temp = tempfile::tempdir().unwrap();
        assert_eq!(clear_dir(&temp.path().join("missing")).await.unwrap(), 0);
    }
}
