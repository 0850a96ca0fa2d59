//! Request pipeline
//!
//! validate → resolve target and local releases → materialize both →
//! fetch artifacts → link → package. The process-wide caches are built once
//! and shared by every request; each request gets its own workspace.

use crate::config::Config;
use crate::error::JlinkResult;
use crate::fetch::{Fetcher, HttpFetcher};
use crate::jlink::RuntimeBuilder;
use crate::maven::DependencyResolver;
use crate::platform::{Arch, Os};
use crate::release::{
    AdoptiumIndex, JavaVersion, ReleaseChannel, ReleaseDescriptor, ReleaseMetadataCache,
    VersionAliases, VersionQuery,
};
use crate::request::{RuntimeRequest, ValidatedRequest};
use crate::runtime::RuntimeStore;
use crate::workspace::BuildWorkspace;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// A packaged runtime image
#[derive(Debug)]
pub struct RuntimeImage {
    /// Archive name, the same as the target release's archive
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub release: ReleaseDescriptor,
}

pub struct RuntimeService {
    releases: Arc<ReleaseMetadataCache>,
    store: Arc<RuntimeStore>,
    resolver: DependencyResolver,
    builder: RuntimeBuilder,
    aliases: VersionAliases,
    maven_enabled: bool,
    local_arch: Arch,
    local_platform: Os,
    tmp_dir: PathBuf,
}

impl RuntimeService {
    /// Build the service with HTTP clients and the persisted release cache
    pub async fn new(config: &Config) -> JlinkResult<Self> {
        let metadata: Arc<dyn Fetcher> =
            Arc::new(HttpFetcher::new(config.release.metadata_timeout()));
        let downloads: Arc<dyn Fetcher> =
            Arc::new(HttpFetcher::new(config.release.download_timeout()));
        let maven: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(config.maven.timeout()));

        let index = AdoptiumIndex::new(config.release.index_url.clone(), metadata);
        let releases = ReleaseMetadataCache::open(
            index,
            config.release.page_size,
            config.release.metadata_file.clone(),
        )
        .await?;
        let store = RuntimeStore::new(
            config.runtime.cache_dir.clone(),
            config.runtime.tmp_dir.clone(),
            downloads,
        );

        Ok(Self::with_parts(
            config,
            Arc::new(releases),
            Arc::new(store),
            maven,
        ))
    }

    /// Build the service around existing caches
    pub fn with_parts(
        config: &Config,
        releases: Arc<ReleaseMetadataCache>,
        store: Arc<RuntimeStore>,
        maven: Arc<dyn Fetcher>,
    ) -> Self {
        Self {
            releases,
            store,
            resolver: DependencyResolver::new(config.maven.repository_url.clone(), maven),
            builder: RuntimeBuilder::new(&config.jlink),
            aliases: VersionAliases::from(&config.release),
            maven_enabled: config.maven.enabled,
            local_arch: config.runtime.local_arch,
            local_platform: config.runtime.local_platform,
            tmp_dir: config.runtime.tmp_dir.clone(),
        }
    }

    pub fn releases(&self) -> &Arc<ReleaseMetadataCache> {
        &self.releases
    }

    pub fn store(&self) -> &Arc<RuntimeStore> {
        &self.store
    }

    pub fn validate(&self, request: &RuntimeRequest) -> JlinkResult<ValidatedRequest> {
        request.validate(&self.aliases, self.maven_enabled)
    }

    /// Validate and build a request
    pub async fn build(&self, request: &RuntimeRequest) -> JlinkResult<RuntimeImage> {
        let validated = self.validate(request)?;
        self.build_validated(validated).await
    }

    pub async fn build_validated(&self, request: ValidatedRequest) -> JlinkResult<RuntimeImage> {
        info!(
            "Runtime request: {} {}/{} version {} modules {:?}",
            request.implementation, request.platform, request.arch, request.version, request.modules
        );

        let target = self
            .releases
            .lookup(
                request.arch,
                request.platform,
                request.implementation,
                &request.version,
            )
            .await?;

        // The local jlink must come from the same release as the target's modules
        let local_query = match (&request.version, JavaVersion::parse(&target.version)) {
            (VersionQuery::Latest { channel: ReleaseChannel::Ea, .. }, _) | (_, Err(_)) => {
                request.version.clone()
            }
            (_, Ok(version)) => VersionQuery::Exact(version),
        };
        let local = self
            .releases
            .lookup(
                self.local_arch,
                self.local_platform,
                request.implementation,
                &local_query,
            )
            .await?;

        let local_runtime = self.store.materialize(&local).await?;
        let target_runtime = self.store.materialize(&target).await?;

        let workspace = BuildWorkspace::create(&self.tmp_dir)?;
        if !request.artifacts.is_empty() {
            self.resolver
                .resolve_all(&workspace.artifact_dir(), &request.artifacts)
                .await?;
        }

        let bytes = self
            .builder
            .build(
                &local_runtime,
                &target_runtime,
                &workspace,
                request.endian,
                &request.modules,
            )
            .await?;

        info!("Generated {} ({} bytes)", target.file_name, bytes.len());
        Ok(RuntimeImage {
            file_name: target.file_name.clone(),
            bytes,
            release: target,
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::error::JlinkError;
    use crate::platform::Implementation;
    use crate::release::IndexQuery;
    use crate::runtime::archive;
    use crate::testing::{linux_runtime_archive, FakeFetcher, FAKE_JLINK};
    use futures_util::future::join_all;
    use serde_json::json;
    use std::time::Duration;
    use tempfile::TempDir;

    const INDEX: &str = "https://api.test";
    const REPO: &str = "https://repo.test/maven2";

    struct Harness {
        temp: TempDir,
        fetcher: Arc<FakeFetcher>,
        config: Config,
    }

    impl Harness {
        fn new(fetcher: Arc<FakeFetcher>) -> Self {
            let temp = TempDir::new().unwrap();
            let mut config = Config::default();
            config.release.index_url = INDEX.to_string();
            config.release.lts = 11;
            config.runtime.cache_dir = temp.path().join("runtimes");
            config.runtime.tmp_dir = temp.path().join("tmp");
            config.runtime.local_arch = Arch::X64;
            config.runtime.local_platform = Os::Linux;
            config.maven.repository_url = REPO.to_string();
            Self {
                temp,
                fetcher,
                config,
            }
        }

        fn service(&self) -> RuntimeService {
            let index = AdoptiumIndex::new(INDEX, self.fetcher.clone());
            let releases = ReleaseMetadataCache::new(index, self.config.release.page_size);
            let store = RuntimeStore::new(
                self.config.runtime.cache_dir.clone(),
                self.config.runtime.tmp_dir.clone(),
                self.fetcher.clone(),
            );
            RuntimeService::with_parts(
                &self.config,
                Arc::new(releases),
                Arc::new(store),
                self.fetcher.clone(),
            )
        }

        fn index_url(&self, major: u32) -> String {
            AdoptiumIndex::new(INDEX, self.fetcher.clone()).assets_url(&IndexQuery::targeted(
                major,
                ReleaseChannel::Ga,
                Arch::X64,
                Os::Linux,
                Implementation::Hotspot,
                self.config.release.page_size,
            ))
        }

        /// Publish a linux x64 release in the index and its archive
        fn publish(&self, version: &str) -> String {
            let file_name = format!(
                "OpenJDK-jdk_x64_linux_hotspot_{}.tar.gz",
                version.replace('+', "_")
            );
            let link = format!("https://dl.test/{}", file_name);
            let body = json!([{
                "release_name": format!("jdk-{}", version),
                "binaries": [{
                    "architecture": "x64",
                    "os": "linux",
                    "jvm_impl": "hotspot",
                    "image_type": "jdk",
                    "package": { "name": file_name, "link": link }
                }]
            }]);
            let major = version.split(['.', '+']).next().unwrap().parse().unwrap();
            self.fetcher
                .insert(&self.index_url(major), serde_json::to_vec(&body).unwrap());
            self.fetcher
                .insert(&link, linux_runtime_archive(version, FAKE_JLINK));
            link
        }

        fn tmp_entries(&self) -> usize {
            std::fs::read_dir(&self.config.runtime.tmp_dir)
                .map(|entries| entries.count())
                .unwrap_or(0)
        }
    }

    fn request(version: &str) -> RuntimeRequest {
        RuntimeRequest {
            arch: "x64".to_string(),
            platform: "linux".to_string(),
            version: version.to_string(),
            modules: vec!["java.base".to_string()],
            ..RuntimeRequest::default()
        }
    }

    #[tokio::test]
    async fn build_exact_version() {
        let harness = Harness::new(FakeFetcher::shared());
        let link = harness.publish("11.0.8+10");
        let service = harness.service();

        let image = service.build(&request("11.0.8+10")).await.unwrap();

        assert_eq!(image.file_name, "OpenJDK-jdk_x64_linux_hotspot_11.0.8_10.tar.gz");
        assert_eq!(harness.fetcher.count(&link), 1);
        assert_eq!(harness.fetcher.count(&harness.index_url(11)), 1);
        assert!(harness.fetcher.requests().iter().all(|url| !url.starts_with(REPO)));
        assert_eq!(harness.tmp_entries(), 0);

        let archive_path = harness.temp.path().join(&image.file_name);
        std::fs::write(&archive_path, &image.bytes).unwrap();
        let out = harness.temp.path().join("out");
        archive::unpack(&archive_path, &out).unwrap();
        let args = std::fs::read_to_string(out.join("jdk-11.0.8+10/lib/args.txt")).unwrap();
        assert!(args.lines().any(|line| line == "java.base"));
    }

    #[tokio::test]
    async fn lts_alias_resolves_configured_major() {
        let harness = Harness::new(FakeFetcher::shared());
        harness.publish("11.0.8+10");
        let service = harness.service();

        let image = service.build(&request("lts")).await.unwrap();

        assert_eq!(image.release.version, "11.0.8+10");
        assert!(harness.fetcher.requests()[0].contains("/feature_releases/11/ga"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_identical_requests_download_once() {
        let harness = Harness::new(FakeFetcher::slow(Duration::from_millis(20)));
        let link = harness.publish("17+35");
        let service = harness.service();
        let req = request("17+35");

        let results = join_all((0..2).map(|_| service.build(&req))).await;

        for result in results {
            assert!(result.is_ok(), "{:?}", result.err());
        }
        assert_eq!(harness.fetcher.count(&link), 1);
    }

    #[tokio::test]
    async fn invalid_version_fails_before_network() {
        let harness = Harness::new(FakeFetcher::shared());
        let service = harness.service();

        let err = service.build(&request("9a.1")).await.unwrap_err();

        assert!(matches!(err, JlinkError::InvalidVersion(_)));
        assert!(harness.fetcher.requests().is_empty());
    }

    #[tokio::test]
    async fn unknown_release_is_not_found() {
        let harness = Harness::new(FakeFetcher::shared());
        harness
            .fetcher
            .insert(&harness.index_url(12), b"[]".to_vec());
        let service = harness.service();

        let err = service.build(&request("12.0.2")).await.unwrap_err();

        assert!(matches!(err, JlinkError::NotFound { .. }));
        assert_eq!(err.reason(), "Failed to find runtime");
    }

    #[tokio::test]
    async fn artifacts_are_fetched_into_the_workspace() {
        let mut harness = Harness::new(FakeFetcher::shared());
        harness.config.maven.enabled = true;
        harness.publish("11.0.8+10");
        let jar = format!("{}/com/example/app/1.0/app-1.0.jar", REPO);
        harness.fetcher.insert(&jar, b"jar".to_vec());
        harness.fetcher.insert(
            &format!("{}/com/example/app/1.0/app-1.0.pom", REPO),
            b"<project></project>".to_vec(),
        );
        let service = harness.service();
        let mut req = request("11.0.8+10");
        req.artifacts = vec!["com.example:app:1.0".to_string()];

        service.build(&req).await.unwrap();

        assert_eq!(harness.fetcher.count(&jar), 1);
        assert_eq!(harness.tmp_entries(), 0);
    }
}
