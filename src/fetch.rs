//! Byte-level HTTP fetching
//!
//! Everything that talks to the network goes through the [`Fetcher`] trait so
//! the pipeline can be exercised without it. The HTTP implementation runs
//! blocking `ureq` calls on the blocking thread pool.

use crate::error::{JlinkError, JlinkResult};
use async_trait::async_trait;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use ureq::Agent;

/// Largest in-memory response accepted (index pages, POM files)
const MAX_BODY_BYTES: u64 = 64 * 1024 * 1024;

/// Abstract "GET bytes" / "GET to file" interface
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch a URL into memory, failing on any non-200 status
    async fn fetch_bytes(&self, url: &str) -> JlinkResult<Vec<u8>>;

    /// Stream a URL to `dest`, returning the number of bytes written
    ///
    /// `dest` only appears once the body has been received completely.
    async fn fetch_to_file(&self, url: &str, dest: &Path) -> JlinkResult<u64>;
}

/// Fetcher backed by a `ureq` agent with a fixed timeout
#[derive(Clone)]
pub struct HttpFetcher {
    agent: Agent,
}

impl HttpFetcher {
    /// Create a fetcher whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self { agent }
    }

    fn get(agent: &Agent, url: &str) -> JlinkResult<ureq::http::Response<ureq::Body>> {
        let response = agent.get(url).call().map_err(|e| JlinkError::fetch(url, e))?;
        let status = response.status();
        if status.as_u16() != 200 {
            return Err(JlinkError::http_status(url, status));
        }
        Ok(response)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_bytes(&self, url: &str) -> JlinkResult<Vec<u8>> {
        debug!("Downloading: {}", url);

        let agent = self.agent.clone();
        let url = url.to_string();
        tokio::task::spawn_blocking(move || {
            let mut response = Self::get(&agent, &url)?;
            response
                .body_mut()
                .with_config()
                .limit(MAX_BODY_BYTES)
                .read_to_vec()
                .map_err(|e| JlinkError::fetch(&url, e))
        })
        .await
        .map_err(|e| JlinkError::Internal(format!("download task failed: {}", e)))?
    }

    async fn fetch_to_file(&self, url: &str, dest: &Path) -> JlinkResult<u64> {
        debug!("Downloading: {} -> {}", url, dest.display());

        let agent = self.agent.clone();
        let url = url.to_string();
        let dest = dest.to_path_buf();
        tokio::task::spawn_blocking(move || {
            let mut response = Self::get(&agent, &url)?;
            let mut reader = response.body_mut().as_reader();
            write_atomically(&dest, |file| io::copy(&mut reader, file))
                .map_err(|e| JlinkError::fetch(&url, e))
        })
        .await
        .map_err(|e| JlinkError::Internal(format!("download task failed: {}", e)))?
    }
}

/// Path of the in-progress sibling of `dest`
pub(crate) fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}

/// Write through a `.part` file and rename it over `dest` on success
pub(crate) fn write_atomically<F>(dest: &Path, write: F) -> io::Result<u64>
where
    F: FnOnce(&mut File) -> io::Result<u64>,
{
    let partial = partial_path(dest);
    let result = File::create(&partial).and_then(|mut file| {
        let written = write(&mut file)?;
        file.sync_all()?;
        Ok(written)
    });

    match result {
        Ok(written) => {
            std::fs::rename(&partial, dest)?;
            Ok(written)
        }
        Err(e) => {
            let _ = std::fs::remove_file(&partial);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn partial_path_appends_suffix() {
        let path = partial_path(Path::new("/tmp/a/guava-33.0.jar"));
        assert_eq!(path, PathBuf::from("/tmp/a/guava-33.0.jar.part"));
    }

    #[test]
    fn write_atomically_renames_on_success() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("file.bin");

        let written = write_atomically(&dest, |f| {
            f.write_all(b"hello")?;
            Ok(5)
        })
        .unwrap();

        assert_eq!(written, 5);
        assert_eq!(std::fs::read(&dest).unwrap(), b"hello");
        assert!(!partial_path(&dest).exists());
    }

    #[test]
    fn write_atomically_leaves_nothing_on_failure() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("file.bin");

        let result = write_atomically(&dest, |f| {
            f.write_all(b"half")?;
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
        });

        assert!(result.is_err());
        assert!(!dest.exists());
        assert!(!partial_path(&dest).exists());
    }

    #[tokio::test]
    async fn unreachable_host_is_fetch_failed() {
        let fetcher = HttpFetcher::new(Duration::from_secs(2));
        let err = fetcher
            .fetch_bytes("http://127.0.0.1:1/releases")
            .await
            .unwrap_err();
        assert!(matches!(err, JlinkError::FetchFailed { .. }));
    }
}
