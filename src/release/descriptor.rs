//! Release descriptors

use crate::platform::{Arch, Implementation, Os};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// One distributable runtime build
///
/// Identity is (architecture, platform, implementation, version); the package
/// fields describe where to get it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseDescriptor {
    pub arch: Arch,
    pub platform: Os,
    pub implementation: Implementation,
    /// Version including its build, e.g. `11.0.8+10`
    pub version: String,
    /// Archive file name, e.g. `OpenJDK11U-jdk_x64_linux_hotspot_11.0.8_10.tar.gz`
    pub file_name: String,
    /// Download URL of the archive
    pub link: String,
    /// SHA-256 of the archive, when the index publishes one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

impl ReleaseDescriptor {
    /// Cache key of this release under a version token
    pub fn key_for(&self, version: &str) -> ReleaseCacheKey {
        ReleaseCacheKey {
            arch: self.arch,
            platform: self.platform,
            implementation: self.implementation,
            version: version.to_string(),
        }
    }

    /// Cache key of this release under its own version
    pub fn key(&self) -> ReleaseCacheKey {
        self.key_for(&self.version)
    }
}

impl PartialEq for ReleaseDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.arch == other.arch
            && self.platform == other.platform
            && self.implementation == other.implementation
            && self.version == other.version
    }
}

impl Eq for ReleaseDescriptor {}

impl Hash for ReleaseDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.arch.hash(state);
        self.platform.hash(state);
        self.implementation.hash(state);
        self.version.hash(state);
    }
}

impl fmt::Display for ReleaseDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}/{}",
            self.implementation, self.version, self.platform, self.arch
        )
    }
}

/// Key of the metadata cache
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReleaseCacheKey {
    pub arch: Arch,
    pub platform: Os,
    pub implementation: Implementation,
    pub version: String,
}
