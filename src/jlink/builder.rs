//! Link and package a runtime image

use crate::config::schema::JlinkConfig;
use crate::error::{JlinkError, JlinkResult};
use crate::jlink::command::JlinkCommand;
use crate::jlink::layout::PlatformLayout;
use crate::platform::Endian;
use crate::runtime::archive::{self, ArchiveFormat};
use crate::runtime::LocalRuntime;
use crate::workspace::BuildWorkspace;
use std::io;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

/// Module every image contains
pub const BASE_MODULE: &str = "java.base";

/// Runs jlink from a local runtime against a target runtime's modules
pub struct RuntimeBuilder {
    compress: String,
    strip_debug: bool,
}

impl RuntimeBuilder {
    pub fn new(config: &JlinkConfig) -> Self {
        Self {
            compress: config.compress.clone(),
            strip_debug: config.strip_debug,
        }
    }

    /// Link `modules` from `target` using the jlink shipped with `local`
    ///
    /// Returns the packaged image, named after the target's archive.
    pub async fn build(
        &self,
        local: &LocalRuntime,
        target: &LocalRuntime,
        workspace: &BuildWorkspace,
        endian: Endian,
        modules: &[String],
    ) -> JlinkResult<Vec<u8>> {
        let mut modules = modules.to_vec();
        if !modules.iter().any(|m| m == BASE_MODULE) {
            modules.insert(0, BASE_MODULE.to_string());
        }

        let module_dir = PlatformLayout::for_os(target.release.platform).module_dir(&target.path);
        if !module_dir.is_dir() {
            return Err(JlinkError::link_failed(format!(
                "module directory {} not found",
                module_dir.display()
            )));
        }
        let module_path = std::env::join_paths([module_dir, workspace.artifact_dir()])
            .map_err(|e| JlinkError::link_failed(format!("invalid module path: {}", e)))?;

        let executable = PlatformLayout::for_os(local.release.platform).jlink_executable(&local.path);
        if !executable.is_file() {
            return Err(JlinkError::link_failed(format!(
                "jlink not found at {}",
                executable.display()
            )));
        }
        make_executable(&executable).await?;

        let output = workspace
            .image_dir()
            .join(format!("jdk-{}", target.release.version));

        info!("Generating runtime {} with modules {:?}", target.release, modules);
        JlinkCommand {
            executable,
            module_path,
            modules,
            endian,
            compress: self.compress.clone(),
            strip_debug: self.strip_debug,
            output: output.clone(),
        }
        .run()
        .await?;

        match fs::remove_dir_all(output.join("legal")).await {
            Ok(()) => debug!("Removed legal notices from {}", output.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(JlinkError::archive(&output, e)),
        }

        let format = ArchiveFormat::from_file_name(&target.release.file_name)
            .unwrap_or(ArchiveFormat::TarGz);
        let dest = workspace.dist_dir().join(&target.release.file_name);
        let (src, to) = (output.clone(), dest.clone());
        tokio::task::spawn_blocking(move || archive::pack(&src, &to, format))
            .await
            .map_err(|e| JlinkError::Internal(format!("packaging task failed: {}", e)))??;

        fs::read(&dest)
            .await
            .map_err(|e| JlinkError::archive(&dest, e))
    }
}

#[cfg(unix)]
async fn make_executable(path: &Path) -> JlinkResult<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path)
        .await
        .map_err(|e| JlinkError::io(format!("reading {}", path.display()), e))?;
    let mut permissions = metadata.permissions();
    permissions.set_mode(permissions.mode() | 0o755);
    fs::set_permissions(path, permissions)
        .await
        .map_err(|e| JlinkError::io(format!("marking {} executable", path.display()), e))
}

#[cfg(not(unix))]
async fn make_executable(_path: &Path) -> JlinkResult<()> {
    Ok(())
}
