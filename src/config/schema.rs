//! Configuration schema for jlink-online
//!
//! Configuration is stored at `~/.config/jlink-online/config.toml`

use crate::platform::{Arch, Os};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// HTTP server settings
    pub server: ServerConfig,

    /// Local runtime cache settings
    pub runtime: RuntimeConfig,

    /// Release index settings
    pub release: ReleaseConfig,

    /// Maven Central integration
    pub maven: MavenConfig,

    /// jlink invocation settings
    pub jlink: JlinkConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind
    pub bind: String,

    /// Listening port
    pub port: u16,

    /// Where `GET /` redirects to
    pub index_redirect: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 80,
            index_redirect: "https://github.com/AdoptOpenJDK/jlink.online".to_string(),
        }
    }
}

/// Local runtime cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Directory holding extracted base runtimes
    pub cache_dir: PathBuf,

    /// Directory for short-lived files (downloads, build workspaces)
    pub tmp_dir: PathBuf,

    /// Architecture of the runtime that executes jlink
    pub local_arch: Arch,

    /// Platform of the runtime that executes jlink
    pub local_platform: Os,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_root().join("runtimes"),
            tmp_dir: std::env::temp_dir(),
            local_arch: Arch::detect().unwrap_or(Arch::X64),
            local_platform: Os::detect().unwrap_or(Os::Linux),
        }
    }
}

/// Release index settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseConfig {
    /// Base URL of the Adoptium API
    pub index_url: String,

    /// Major version served for the `lts` alias
    pub lts: u32,

    /// Major version served for the `ga` alias
    pub ga: u32,

    /// Major version served for the `ea` alias
    pub ea: u32,

    /// Major versions indexed by a full refresh
    pub refresh_majors: Vec<u32>,

    /// Seconds between background refreshes while serving (0 disables)
    pub refresh_interval_secs: u64,

    /// On-disk snapshot of the metadata cache
    pub metadata_file: PathBuf,

    /// Releases requested per index page (the index serves at most 20)
    pub page_size: u32,

    /// Timeout for metadata queries
    pub metadata_timeout_secs: u64,

    /// Timeout for runtime archive downloads
    pub download_timeout_secs: u64,
}

impl ReleaseConfig {
    pub fn metadata_timeout(&self) -> Duration {
        Duration::from_secs(self.metadata_timeout_secs)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            index_url: "https://api.adoptium.net".to_string(),
            lts: 25,
            ga: 25,
            ea: 26,
            refresh_majors: (9..=25).collect(),
            refresh_interval_secs: 0,
            metadata_file: default_cache_root().join("releases.json"),
            page_size: 20,
            metadata_timeout_secs: 30,
            download_timeout_secs: 600,
        }
    }
}

/// Maven Central integration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MavenConfig {
    /// Whether requests may include artifacts
    pub enabled: bool,

    /// Repository base URL
    pub repository_url: String,

    /// Timeout for artifact downloads
    pub timeout_secs: u64,
}

impl MavenConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for MavenConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            repository_url: "https://repo1.maven.org/maven2".to_string(),
            timeout_secs: 60,
        }
    }
}

/// jlink invocation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JlinkConfig {
    /// Value passed to `--compress`
    pub compress: String,

    /// Pass `--strip-debug`
    pub strip_debug: bool,
}

impl Default for JlinkConfig {
    fn default() -> Self {
        Self {
            compress: "0".to_string(),
            strip_debug: true,
        }
    }
}

fn default_cache_root() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("jlink-online")
}
