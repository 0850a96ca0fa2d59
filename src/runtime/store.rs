//! On-disk store of extracted base runtimes
//!
//! Every runtime lives in `<root>/<archive name without extension>/`. A single
//! store-wide lock serializes population: a second request for a runtime that
//! is being downloaded waits and then finds it in place. Extraction happens in
//! a hidden staging directory that is renamed into place only when complete,
//! so a runtime directory is never observed half-extracted.

use crate::error::{JlinkError, JlinkResult};
use crate::fetch::Fetcher;
use crate::release::ReleaseDescriptor;
use crate::runtime::archive::{self, strip_archive_extension};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// An extracted runtime ready for use
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalRuntime {
    /// Runtime root (the directory containing `bin/`, `jmods/` or `Contents/`)
    pub path: PathBuf,
    /// Release the runtime was extracted from
    pub release: ReleaseDescriptor,
}

/// A runtime directory present in the store
#[derive(Debug, Clone)]
pub struct CachedRuntime {
    pub name: String,
    pub path: PathBuf,
}

/// Process-wide runtime store
pub struct RuntimeStore {
    root: PathBuf,
    tmp_dir: PathBuf,
    fetcher: Arc<dyn Fetcher>,
    lock: Mutex<()>,
}

impl RuntimeStore {
    pub fn new(root: PathBuf, tmp_dir: PathBuf, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            root,
            tmp_dir,
            fetcher,
            lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory a release is extracted into
    pub fn cache_dir(&self, release: &ReleaseDescriptor) -> PathBuf {
        self.root.join(strip_archive_extension(&release.file_name))
    }

    /// Make sure a release is downloaded and extracted, returning its root
    ///
    /// Population runs in its own task: if the caller goes away, the download
    /// still completes and fills the store.
    pub async fn materialize(self: &Arc<Self>, release: &ReleaseDescriptor) -> JlinkResult<LocalRuntime> {
        let store = Arc::clone(self);
        let release = release.clone();
        tokio::spawn(async move { store.materialize_locked(release).await })
            .await
            .map_err(|e| JlinkError::Internal(format!("runtime download task failed: {}", e)))?
    }

    async fn materialize_locked(&self, release: ReleaseDescriptor) -> JlinkResult<LocalRuntime> {
        let _guard = self.lock.lock().await;

        let dir = self.cache_dir(&release);
        if dir.is_dir() {
            debug!("Runtime cache hit: {}", dir.display());
            return Ok(LocalRuntime {
                path: runtime_root(&dir, &release)?,
                release,
            });
        }

        for path in [&self.root, &self.tmp_dir] {
            fs::create_dir_all(path)
                .await
                .map_err(|e| JlinkError::io(format!("creating directory {}", path.display()), e))?;
        }

        // Removed with everything in it when dropped
        let download = tempfile::Builder::new()
            .prefix("runtime-")
            .tempdir_in(&self.tmp_dir)
            .map_err(|e| JlinkError::io("creating download directory", e))?;
        let archive_path = download.path().join(&release.file_name);

        info!("RUNTIME QUERY: {}", release.link);
        self.fetcher.fetch_to_file(&release.link, &archive_path).await?;

        if let Some(expected) = release.checksum.clone() {
            let path = archive_path.clone();
            let actual = tokio::task::spawn_blocking(move || sha256_file(&path))
                .await
                .map_err(|e| JlinkError::Internal(format!("checksum task failed: {}", e)))?
                .map_err(|e| JlinkError::io("hashing runtime archive", e))?;
            if !actual.eq_ignore_ascii_case(&expected) {
                return Err(JlinkError::fetch(
                    &release.link,
                    format!("checksum mismatch: expected {}, got {}", expected, actual),
                ));
            }
        }

        let staging = self.staging_dir(&release);
        if staging.exists() {
            remove_dir_logged(&staging).await;
        }

        let (from, to) = (archive_path.clone(), staging.clone());
        let extracted = tokio::task::spawn_blocking(move || archive::unpack(&from, &to))
            .await
            .map_err(|e| JlinkError::Internal(format!("extraction task failed: {}", e)))
            .and_then(|result| result);
        if let Err(e) = extracted {
            remove_dir_logged(&staging).await;
            return Err(e);
        }

        if let Err(e) = fs::rename(&staging, &dir).await {
            remove_dir_logged(&staging).await;
            remove_dir_logged(&dir).await;
            return Err(JlinkError::io(
                format!("moving runtime into {}", dir.display()),
                e,
            ));
        }

        let path = match runtime_root(&dir, &release) {
            Ok(path) => path,
            Err(e) => {
                remove_dir_logged(&dir).await;
                return Err(e);
            }
        };
        info!("Runtime {} ready at {}", release, path.display());
        Ok(LocalRuntime { path, release })
    }

    fn staging_dir(&self, release: &ReleaseDescriptor) -> PathBuf {
        self.root.join(format!(
            ".{}.partial",
            strip_archive_extension(&release.file_name)
        ))
    }

    /// Runtimes currently in the store
    pub async fn list(&self) -> JlinkResult<Vec<CachedRuntime>> {
        let mut runtimes = Vec::new();
        if !self.root.exists() {
            return Ok(runtimes);
        }

        let mut entries = fs::read_dir(&self.root)
            .await
            .map_err(|e| JlinkError::io(format!("reading {}", self.root.display()), e))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| JlinkError::io(format!("reading {}", self.root.display()), e))?
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') || !entry.path().is_dir() {
                continue;
            }
            runtimes.push(CachedRuntime {
                name,
                path: entry.path(),
            });
        }

        runtimes.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(runtimes)
    }

    /// Remove every runtime from the store, returning how many were removed
    pub async fn clear(&self) -> JlinkResult<usize> {
        let _guard = self.lock.lock().await;

        let runtimes = self.list().await?;
        for runtime in &runtimes {
            fs::remove_dir_all(&runtime.path).await.map_err(|e| {
                JlinkError::io(format!("removing {}", runtime.path.display()), e)
            })?;
            info!("Removed cached runtime: {}", runtime.name);
        }
        Ok(runtimes.len())
    }
}

/// Locate the runtime root inside an extracted release
///
/// Archives conventionally contain `jdk-<version>/`; otherwise the single
/// top-level directory is used.
fn runtime_root(dir: &Path, release: &ReleaseDescriptor) -> JlinkResult<PathBuf> {
    let conventional = dir.join(format!("jdk-{}", release.version));
    if conventional.is_dir() {
        return Ok(conventional);
    }

    let entries = std::fs::read_dir(dir)
        .map_err(|e| JlinkError::io(format!("reading {}", dir.display()), e))?;
    let dirs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();

    match dirs.as_slice() {
        [only] => Ok(only.clone()),
        _ => Err(JlinkError::archive(
            dir,
            format!("no runtime root for {} in extracted archive", release.version),
        )),
    }
}

fn sha256_file(path: &Path) -> io::Result<String> {
    let mut hasher = Sha256::new();
    io::copy(&mut File::open(path)?, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

async fn remove_dir_logged(path: &Path) {
    match fs::remove_dir_all(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Arch, Implementation, Os};
    use crate::testing::{linux_runtime_archive, tar_gz, Entry, FakeFetcher, FAKE_JLINK};
    use futures_util::future::join_all;
    use std::time::Duration;
    use tempfile::TempDir;

    const LINK: &str = "https://dl.test/OpenJDK11U-jdk_x64_linux_hotspot_11.0.8_10.tar.gz";

    fn release() -> ReleaseDescriptor {
        ReleaseDescriptor {
            arch: Arch::X64,
            platform: Os::Linux,
            implementation: Implementation::Hotspot,
            version: "11.0.8+10".to_string(),
            file_name: "OpenJDK11U-jdk_x64_linux_hotspot_11.0.8_10.tar.gz".to_string(),
            link: LINK.to_string(),
            checksum: None,
        }
    }

    fn store(temp: &TempDir, fetcher: Arc<FakeFetcher>) -> Arc<RuntimeStore> {
        Arc::new(RuntimeStore::new(
            temp.path().join("runtimes"),
            temp.path().join("tmp"),
            fetcher,
        ))
    }

    #[tokio::test]
    async fn materialize_downloads_and_extracts_once() {
        let temp = TempDir::new().unwrap();
        let fetcher = FakeFetcher::shared();
        fetcher.insert(LINK, linux_runtime_archive("11.0.8+10", FAKE_JLINK));
        let store = store(&temp, fetcher.clone());

        let first = store.materialize(&release()).await.unwrap();
        let second = store.materialize(&release()).await.unwrap();

        assert_eq!(
            first.path,
            temp.path()
                .join("runtimes/OpenJDK11U-jdk_x64_linux_hotspot_11.0.8_10/jdk-11.0.8+10")
        );
        assert!(first.path.join("jmods/java.base.jmod").exists());
        assert_eq!(first, second);
        assert_eq!(fetcher.count(LINK), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_materialize_downloads_once() {
        let temp = TempDir::new().unwrap();
        let fetcher = FakeFetcher::slow(Duration::from_millis(50));
        fetcher.insert(LINK, linux_runtime_archive("11.0.8+10", FAKE_JLINK));
        let store = store(&temp, fetcher.clone());
        let release = release();

        let handles = join_all((0..8).map(|_| store.materialize(&release))).await;

        let paths: Vec<PathBuf> = handles.into_iter().map(|h| h.unwrap().path).collect();
        assert!(paths.iter().all(|p| *p == paths[0]));
        assert!(paths[0].join("release").exists());
        assert_eq!(fetcher.count(LINK), 1);
    }

    #[tokio::test]
    async fn failed_download_leaves_no_cache_dir() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp, FakeFetcher::shared());

        let err = store.materialize(&release()).await.unwrap_err();

        assert!(matches!(err, JlinkError::FetchFailed { .. }));
        assert!(!store.cache_dir(&release()).exists());
    }

    #[tokio::test]
    async fn failed_extraction_cleans_up_and_retries() {
        let temp = TempDir::new().unwrap();
        let fetcher = FakeFetcher::shared();
        fetcher.insert(LINK, b"truncated".to_vec());
        let store = store(&temp, fetcher.clone());

        let err = store.materialize(&release()).await.unwrap_err();
        assert!(matches!(err, JlinkError::ArchiveFailed { .. }));
        assert!(!store.cache_dir(&release()).exists());
        assert!(!store.staging_dir(&release()).exists());

        fetcher.insert(LINK, linux_runtime_archive("11.0.8+10", FAKE_JLINK));
        let runtime = store.materialize(&release()).await.unwrap();
        assert!(runtime.path.is_dir());
        assert_eq!(fetcher.count(LINK), 2);
    }

    #[tokio::test]
    async fn checksum_mismatch_is_fetch_failed() {
        let temp = TempDir::new().unwrap();
        let fetcher = FakeFetcher::shared();
        fetcher.insert(LINK, linux_runtime_archive("11.0.8+10", FAKE_JLINK));
        let store = store(&temp, fetcher);
        let mut release = release();
        release.checksum = Some("00".repeat(32));

        let err = store.materialize(&release).await.unwrap_err();

        assert!(matches!(err, JlinkError::FetchFailed { .. }));
        assert!(!store.cache_dir(&release).exists());
    }

    #[tokio::test]
    async fn matching_checksum_is_accepted() {
        let temp = TempDir::new().unwrap();
        let fetcher = FakeFetcher::shared();
        let archive = linux_runtime_archive("11.0.8+10", FAKE_JLINK);
        let checksum = hex::encode(Sha256::digest(&archive));
        fetcher.insert(LINK, archive);
        let store = store(&temp, fetcher);
        let mut release = release();
        release.checksum = Some(checksum.to_uppercase());

        assert!(store.materialize(&release).await.is_ok());
    }

    #[tokio::test]
    async fn unconventional_root_uses_single_directory() {
        let temp = TempDir::new().unwrap();
        let fetcher = FakeFetcher::shared();
        fetcher.insert(
            LINK,
            tar_gz(&[Entry::Dir("jdk-11.0.8+10-custom/"), Entry::File("jdk-11.0.8+10-custom/release", b"")]),
        );
        let store = store(&temp, fetcher);

        let runtime = store.materialize(&release()).await.unwrap();
        assert!(runtime.path.ends_with("jdk-11.0.8+10-custom"));
    }

    #[tokio::test]
    async fn list_and_clear() {
        let temp = TempDir::new().unwrap();
        let fetcher = FakeFetcher::shared();
        fetcher.insert(LINK, linux_runtime_archive("11.0.8+10", FAKE_JLINK));
        let store = store(&temp, fetcher);
        store.materialize(&release()).await.unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "OpenJDK11U-jdk_x64_linux_hotspot_11.0.8_10");

        assert_eq!(store.clear().await.unwrap(), 1);
        assert!(store.list().await.unwrap().is_empty());
    }
}
