//! Per-request scratch directory
//!
//! Everything a single build writes (downloaded artifacts, the linked image
//! and its archive) lives under one temporary directory that is deleted when
//! the workspace is dropped.

use crate::error::{JlinkError, JlinkResult};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

pub struct BuildWorkspace {
    dir: TempDir,
}

impl BuildWorkspace {
    /// Create a workspace under `parent`
    pub fn create(parent: &Path) -> JlinkResult<Self> {
        std::fs::create_dir_all(parent)
            .map_err(|e| JlinkError::io(format!("creating {}", parent.display()), e))?;
        let dir = tempfile::Builder::new()
            .prefix("build-")
            .tempdir_in(parent)
            .map_err(|e| JlinkError::io("creating build workspace", e))?;

        let workspace = Self { dir };
        for sub in [workspace.artifact_dir(), workspace.image_dir(), workspace.dist_dir()] {
            std::fs::create_dir(&sub)
                .map_err(|e| JlinkError::io(format!("creating {}", sub.display()), e))?;
        }

        debug!("Created build workspace {}", workspace.path().display());
        Ok(workspace)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Downloaded Maven artifacts, added to the module path
    pub fn artifact_dir(&self) -> PathBuf {
        self.path().join("artifacts")
    }

    /// Parent of the linked image
    pub fn image_dir(&self) -> PathBuf {
        self.path().join("image")
    }

    /// Packaged image
    pub fn dist_dir(&self) -> PathBuf {
        self.path().join("dist")
    }
}
