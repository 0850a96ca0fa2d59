//! Adoptium release index client
//!
//! Mirrors the parts of the v3 `assets/feature_releases` schema that the
//! pipeline needs: releases, their binaries and each binary's package.

use crate::error::{JlinkError, JlinkResult};
use crate::fetch::Fetcher;
use crate::platform::{Arch, Implementation, Os};
use crate::release::descriptor::ReleaseDescriptor;
use crate::release::version::ReleaseChannel;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

/// Largest page the index serves
pub const MAX_PAGE_SIZE: u32 = 20;

/// Upper bound on pages read by one scan
const MAX_PAGES: u32 = 50;

/// Filters for one index query
#[derive(Debug, Clone)]
pub struct IndexQuery {
    pub major: u32,
    pub channel: ReleaseChannel,
    pub arch: Option<Arch>,
    pub platform: Option<Os>,
    pub implementation: Option<Implementation>,
    pub page_size: u32,
    pub page: u32,
}

impl IndexQuery {
    /// Query for one platform/arch/implementation
    pub fn targeted(
        major: u32,
        channel: ReleaseChannel,
        arch: Arch,
        platform: Os,
        implementation: Implementation,
        page_size: u32,
    ) -> Self {
        Self {
            major,
            channel,
            arch: Some(arch),
            platform: Some(platform),
            implementation: Some(implementation),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
            page: 0,
        }
    }

    /// Query for every platform of a major version
    pub fn all(major: u32, page_size: u32) -> Self {
        Self {
            major,
            channel: ReleaseChannel::Ga,
            arch: None,
            platform: None,
            implementation: None,
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
            page: 0,
        }
    }

    /// The same query for another page
    pub fn at_page(&self, page: u32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }
}

/// A release as returned by the index
#[derive(Debug, Clone, Deserialize)]
pub struct IndexRelease {
    pub release_name: String,
    #[serde(default)]
    pub binaries: Vec<IndexBinary>,
}

impl IndexRelease {
    /// Version of the release: `jdk-11.0.8+10` -> `11.0.8+10`
    ///
    /// Early-access suffixes after the build (`jdk-24+20-ea-beta`) are dropped.
    pub fn version(&self) -> &str {
        let name = self
            .release_name
            .strip_prefix("jdk-")
            .unwrap_or(&self.release_name);
        match name.find('+') {
            Some(plus) => match name[plus..].find('-') {
                Some(dash) => &name[..plus + dash],
                None => name,
            },
            None => name,
        }
    }
}

/// A binary of a release
#[derive(Debug, Clone, Deserialize)]
pub struct IndexBinary {
    pub architecture: String,
    pub os: String,
    pub jvm_impl: String,
    #[serde(default)]
    pub image_type: Option<String>,
    pub package: Option<IndexPackage>,
}

impl IndexBinary {
    /// Convert into a descriptor, skipping binaries this service cannot use
    pub fn descriptor(&self, version: &str) -> Option<ReleaseDescriptor> {
        if self.image_type.as_deref().is_some_and(|t| t != "jdk") {
            return None;
        }
        let package = self.package.as_ref()?;

        Some(ReleaseDescriptor {
            arch: self.architecture.parse().ok()?,
            platform: self.os.parse().ok()?,
            implementation: self.jvm_impl.parse().ok()?,
            version: version.to_string(),
            file_name: package.name.clone(),
            link: package.link.clone(),
            checksum: package.checksum.clone().filter(|c| !c.is_empty()),
        })
    }
}

/// The downloadable archive of a binary
#[derive(Debug, Clone, Deserialize)]
pub struct IndexPackage {
    pub name: String,
    pub link: String,
    #[serde(default)]
    pub checksum: Option<String>,
}

/// Client for the Adoptium API
pub struct AdoptiumIndex {
    base_url: String,
    fetcher: Arc<dyn Fetcher>,
}

impl AdoptiumIndex {
    pub fn new(base_url: impl Into<String>, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            fetcher,
        }
    }

    /// URL of a `feature_releases` query
    pub fn assets_url(&self, query: &IndexQuery) -> String {
        let mut url = format!(
            "{}/v3/assets/feature_releases/{}/{}?image_type=jdk&page={}&page_size={}&sort_order=DESC",
            self.base_url,
            query.major,
            query.channel.as_str(),
            query.page,
            query.page_size
        );
        if let Some(arch) = query.arch {
            url.push_str(&format!("&architecture={}", arch));
        }
        if let Some(platform) = query.platform {
            url.push_str(&format!("&os={}", platform));
        }
        if let Some(implementation) = query.implementation {
            url.push_str(&format!("&jvm_impl={}", implementation));
        }
        url
    }

    /// Fetch the releases matching a query, newest first
    pub async fn releases(&self, query: &IndexQuery) -> JlinkResult<Vec<IndexRelease>> {
        let url = self.assets_url(query);
        debug!("METADATA QUERY: {}", url);

        let body = self.fetcher.fetch_bytes(&url).await?;
        serde_json::from_slice(&body)
            .map_err(|e| JlinkError::fetch(url, format!("malformed release index: {}", e)))
    }

    /// Read pages of a query, newest first, until one satisfies `done`
    ///
    /// Also stops at a short page or when the index reports no further
    /// pages. Returns every release read.
    pub async fn scan<F>(&self, query: &IndexQuery, mut done: F) -> JlinkResult<Vec<IndexRelease>>
    where
        F: FnMut(&[IndexRelease]) -> bool,
    {
        let mut seen = Vec::new();
        for page in 0..MAX_PAGES {
            let releases = match self.releases(&query.at_page(page)).await {
                Ok(releases) => releases,
                Err(e) if page > 0 && e.is_missing_resource() => break,
                Err(e) => return Err(e),
            };
            let last = releases.len() < query.page_size as usize || done(&releases);
            seen.extend(releases);
            if last {
                break;
            }
        }
        Ok(seen)
    }
}
