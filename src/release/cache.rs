//! Release metadata cache
//!
//! Memoizes index lookups in memory and in a JSON snapshot on disk. The map
//! lock is never held across I/O, so lookups are not blocked by downloads or
//! by other lookups waiting on the index.

use crate::error::{JlinkError, JlinkResult};
use crate::platform::{Arch, Implementation, Os};
use crate::release::descriptor::{ReleaseCacheKey, ReleaseDescriptor};
use crate::release::index::{AdoptiumIndex, IndexQuery, IndexRelease};
use crate::release::version::{base_version, compare_build, ReleaseChannel, VersionQuery};
use chrono::{DateTime, Utc};
use futures_util::future::try_join_all;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};
use uuid::Uuid;

type ReleaseMap = HashMap<ReleaseCacheKey, ReleaseDescriptor>;

/// On-disk form of the cache
#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    refreshed_at: DateTime<Utc>,
    entries: Vec<SnapshotEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotEntry {
    /// Version token the release is cached under
    version: String,
    release: ReleaseDescriptor,
}

/// Process-wide cache of release metadata
pub struct ReleaseMetadataCache {
    index: AdoptiumIndex,
    page_size: u32,
    snapshot_path: Option<PathBuf>,
    entries: Mutex<ReleaseMap>,
    /// Orders snapshot writes so the newest map is the one left on disk
    persist_lock: tokio::sync::Mutex<()>,
}

impl ReleaseMetadataCache {
    /// Create an in-memory cache
    pub fn new(index: AdoptiumIndex, page_size: u32) -> Self {
        Self {
            index,
            page_size,
            snapshot_path: None,
            entries: Mutex::new(HashMap::new()),
            persist_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Create a cache persisted at `path`, loading the snapshot if present
    pub async fn open(index: AdoptiumIndex, page_size: u32, path: PathBuf) -> JlinkResult<Self> {
        let entries = match load_snapshot(&path).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Ignoring unreadable release snapshot: {}", e);
                HashMap::new()
            }
        };
        debug!("Loaded {} cached releases from {}", entries.len(), path.display());

        Ok(Self {
            index,
            page_size,
            snapshot_path: Some(path),
            entries: Mutex::new(entries),
            persist_lock: tokio::sync::Mutex::new(()),
        })
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cached release for a key
    pub fn get(&self, key: &ReleaseCacheKey) -> Option<ReleaseDescriptor> {
        self.entries.lock().get(key).cloned()
    }

    /// Cache a release under a version token
    ///
    /// An existing entry is only replaced by a strictly newer build. Returns
    /// whether the map changed.
    pub fn insert(&self, version: &str, release: ReleaseDescriptor) -> bool {
        insert_newest(&mut self.entries.lock(), version, release)
    }

    /// Find the release for a platform and version query
    pub async fn lookup(
        &self,
        arch: Arch,
        platform: Os,
        implementation: Implementation,
        query: &VersionQuery,
    ) -> JlinkResult<ReleaseDescriptor> {
        let not_found = || JlinkError::NotFound {
            arch: arch.to_string(),
            platform: platform.to_string(),
            implementation: implementation.to_string(),
            version: query.to_string(),
        };

        let found = match query {
            VersionQuery::Exact(version) => {
                let key = ReleaseCacheKey {
                    arch,
                    platform,
                    implementation,
                    version: version.as_str().to_string(),
                };
                if let Some(release) = self.get(&key) {
                    debug!("Release cache hit: {}", release);
                    return Ok(release);
                }

                let index_query = IndexQuery::targeted(
                    version.major(),
                    ReleaseChannel::Ga,
                    arch,
                    platform,
                    implementation,
                    self.page_size,
                );
                // Builds of one version are adjacent; stop after the last of them
                let mut matched = false;
                let releases = self
                    .index
                    .scan(&index_query, |page| {
                        matched |= page.iter().any(|r| version.matches(r.version()));
                        matched && !page.last().is_some_and(|r| version.matches(r.version()))
                    })
                    .await?;
                let release = select_newest(&releases, arch, platform, implementation, |v| {
                    version.matches(v)
                })
                .ok_or_else(not_found)?;

                self.insert(version.as_str(), release.clone());
                release
            }
            VersionQuery::Latest { major, channel } => {
                let index_query = IndexQuery::targeted(
                    *major,
                    *channel,
                    arch,
                    platform,
                    implementation,
                    self.page_size,
                );
                let releases = self.index.releases(&index_query).await?;
                select_first(&releases, arch, platform, implementation).ok_or_else(not_found)?
            }
        };

        self.insert(&found.version, found.clone());
        if let Err(e) = self.persist().await {
            warn!("Failed to persist release cache: {}", e);
        }

        info!("Resolved {} to {}", query, found);
        Ok(found)
    }

    /// Rebuild the whole cache from the index for the given major versions
    ///
    /// Every release is cached under its full version and its base version;
    /// duplicates keep the newest build. Returns the number of entries.
    pub async fn refresh(&self, majors: &[u32]) -> JlinkResult<usize> {
        let queries: Vec<IndexQuery> = majors
            .iter()
            .map(|major| IndexQuery::all(*major, self.page_size))
            .collect();
        let pages = try_join_all(queries.iter().map(|q| self.index.scan(q, |_| false))).await?;

        let mut fresh = HashMap::new();
        for release in pages.iter().flatten() {
            let version = release.version();
            for binary in &release.binaries {
                if let Some(descriptor) = binary.descriptor(version) {
                    insert_newest(&mut fresh, base_version(version), descriptor.clone());
                    insert_newest(&mut fresh, version, descriptor);
                }
            }
        }

        let count = fresh.len();
        *self.entries.lock() = fresh;
        self.persist().await?;

        info!("Release cache rebuilt with {} entries", count);
        Ok(count)
    }

    /// Write the snapshot, if this cache is persisted
    pub async fn persist(&self) -> JlinkResult<()> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };
        let _guard = self.persist_lock.lock().await;

        let mut entries: Vec<SnapshotEntry> = self
            .entries
            .lock()
            .iter()
            .map(|(key, release)| SnapshotEntry {
                version: key.version.clone(),
                release: release.clone(),
            })
            .collect();
        entries.sort_by_key(|entry| entry.release.key_for(&entry.version));

        let snapshot = Snapshot {
            refreshed_at: Utc::now(),
            entries,
        };
        let content = serde_json::to_string_pretty(&snapshot)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| JlinkError::io(format!("creating directory {}", parent.display()), e))?;
        }
        let tmp = path.with_extension(format!("{}.tmp", Uuid::new_v4().simple()));
        fs::write(&tmp, content)
            .await
            .map_err(|e| JlinkError::io(format!("writing release snapshot {}", tmp.display()), e))?;
        fs::rename(&tmp, path)
            .await
            .map_err(|e| JlinkError::io(format!("replacing release snapshot {}", path.display()), e))?;
        Ok(())
    }
}

/// Insert unless an equal-or-newer build is already cached under the key
fn insert_newest(map: &mut ReleaseMap, version: &str, release: ReleaseDescriptor) -> bool {
    let key = release.key_for(version);
    match map.get(&key) {
        Some(existing) if compare_build(&existing.version, &release.version) != Ordering::Less => {
            false
        }
        _ => {
            map.insert(key, release);
            true
        }
    }
}

/// Newest build among the releases whose version satisfies `accept`
fn select_newest<F>(
    releases: &[IndexRelease],
    arch: Arch,
    platform: Os,
    implementation: Implementation,
    accept: F,
) -> Option<ReleaseDescriptor>
where
    F: Fn(&str) -> bool,
{
    releases
        .iter()
        .filter(|release| accept(release.version()))
        .filter_map(|release| matching_binary(release, arch, platform, implementation))
        .max_by(|a, b| compare_build(&a.version, &b.version))
}

/// First release (the index returns newest first) with a matching binary
fn select_first(
    releases: &[IndexRelease],
    arch: Arch,
    platform: Os,
    implementation: Implementation,
) -> Option<ReleaseDescriptor> {
    releases
        .iter()
        .find_map(|release| matching_binary(release, arch, platform, implementation))
}

fn matching_binary(
    release: &IndexRelease,
    arch: Arch,
    platform: Os,
    implementation: Implementation,
) -> Option<ReleaseDescriptor> {
    release
        .binaries
        .iter()
        .filter_map(|binary| binary.descriptor(release.version()))
        .find(|d| d.arch == arch && d.platform == platform && d.implementation == implementation)
}

async fn load_snapshot(path: &Path) -> JlinkResult<ReleaseMap> {
    if !path.exists() {
        return Ok(HashMap::new());
    }

    let content = fs::read_to_string(path)
        .await
        .map_err(|e| JlinkError::io(format!("reading release snapshot {}", path.display()), e))?;
    let snapshot: Snapshot = serde_json::from_str(&content)?;

    let mut map = HashMap::new();
    for entry in snapshot.entries {
        insert_newest(&mut map, &entry.version, entry.release);
    }
    Ok(map)
}
