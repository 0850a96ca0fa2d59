//! Transitive artifact download from a Maven repository

use crate::error::{JlinkError, JlinkResult};
use crate::fetch::Fetcher;
use crate::maven::coordinate::ArtifactCoordinate;
use crate::maven::pom::Pom;
use futures_util::future::{BoxFuture, FutureExt};
use std::collections::BTreeSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Downloads artifacts and their non-test dependencies into a directory
pub struct DependencyResolver {
    repository: String,
    fetcher: Arc<dyn Fetcher>,
}

/// Traversal state for one `resolve_all` call
#[derive(Default)]
struct Walk {
    visited: BTreeSet<ArtifactCoordinate>,
    path: Vec<ArtifactCoordinate>,
}

impl DependencyResolver {
    pub fn new(repository: impl Into<String>, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            repository: repository.into(),
            fetcher,
        }
    }

    /// Download every coordinate and, transitively, its dependencies
    ///
    /// A jar only appears in `output_dir` once its dependencies are there
    /// too. One already present is not fetched again and its dependencies
    /// are not revisited.
    pub async fn resolve_all(
        &self,
        output_dir: &Path,
        coordinates: &[ArtifactCoordinate],
    ) -> JlinkResult<()> {
        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|e| JlinkError::io(format!("creating {}", output_dir.display()), e))?;

        let mut walk = Walk::default();
        self.resolve_each(output_dir, coordinates.to_vec(), &mut walk)
            .await
    }

    fn resolve_each<'a>(
        &'a self,
        output_dir: &'a Path,
        coordinates: Vec<ArtifactCoordinate>,
        walk: &'a mut Walk,
    ) -> BoxFuture<'a, JlinkResult<()>> {
        async move {
            for coordinate in coordinates {
                if let Some(start) = walk.path.iter().position(|c| *c == coordinate) {
                    let cycle: Vec<String> = walk.path[start..]
                        .iter()
                        .chain(std::iter::once(&coordinate))
                        .map(|c| c.to_string())
                        .collect();
                    return Err(JlinkError::CyclicDependency(cycle.join(" -> ")));
                }
                if !walk.visited.insert(coordinate.clone()) {
                    continue;
                }

                let jar = output_dir.join(coordinate.jar_file_name());
                if jar.exists() {
                    debug!("Artifact already present: {}", jar.display());
                    continue;
                }

                // The jar keeps a pending name until its dependencies are in
                // place, so a present jar always comes with its closure
                let pending = pending_path(&jar);
                let result = self
                    .resolve_one(output_dir, coordinate, &pending, walk)
                    .await
                    .and_then(|()| {
                        std::fs::rename(&pending, &jar).map_err(|e| {
                            JlinkError::io(format!("moving {} into place", jar.display()), e)
                        })
                    });
                if result.is_err() {
                    let _ = std::fs::remove_file(&pending);
                }
                result?;
            }
            Ok(())
        }
        .boxed()
    }

    /// Fetch the jar to `pending`, then the POM, then the dependencies
    async fn resolve_one(
        &self,
        output_dir: &Path,
        coordinate: ArtifactCoordinate,
        pending: &Path,
        walk: &mut Walk,
    ) -> JlinkResult<()> {
        let jar_url = coordinate.jar_url(&self.repository);
        info!("Downloading Maven Central artifact: {}", jar_url);
        self.fetcher.fetch_to_file(&jar_url, pending).await?;

        let pom_url = coordinate.pom_url(&self.repository);
        info!("Downloading Maven Central POM: {}", pom_url);
        let body = self.fetcher.fetch_bytes(&pom_url).await?;
        let pom = Pom::parse(&body)
            .map_err(|e| JlinkError::fetch(&pom_url, format!("malformed POM: {}", e)))?;

        walk.path.push(coordinate);
        self.resolve_each(output_dir, pom.runtime_dependencies(), walk)
            .await?;
        walk.path.pop();
        Ok(())
    }
}

/// Hidden sibling a jar is downloaded to before it is complete
fn pending_path(jar: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(jar.file_name().unwrap_or_default());
    name.push(".pending");
    jar.with_file_name(name)
}
