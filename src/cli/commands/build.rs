//! Build command - produce one runtime image without the HTTP service

use crate::cli::args::BuildArgs;
use crate::config::{Config, ConfigManager};
use crate::error::{JlinkError, JlinkResult};
use crate::jlink::parse_module_info;
use crate::release::VersionAliases;
use crate::request::RuntimeRequest;
use crate::service::RuntimeService;
use console::style;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Execute the build command
pub async fn execute(args: BuildArgs, config: &Config) -> JlinkResult<()> {
    let mut modules = args.modules;
    if let Some(path) = &args.module_info {
        let source = fs::read_to_string(path)
            .await
            .map_err(|e| JlinkError::io(format!("reading {}", path.display()), e))?;
        let required = parse_module_info(&source);
        debug!("{} requires {:?}", path.display(), required);
        modules.extend(required);
    }

    let request = RuntimeRequest {
        arch: args.arch,
        platform: args.os,
        version: args.java_version,
        implementation: Some(args.implementation),
        endian: args.endian,
        modules,
        artifacts: args.artifacts,
    };

    // Reject bad input before touching the disk or the network
    let validated = request.validate(&VersionAliases::from(&config.release), config.maven.enabled)?;

    ConfigManager::ensure_dirs(config).await?;
    let service = RuntimeService::new(config).await?;
    let image = service.build_validated(validated).await?;

    let dest = output_path(args.output.as_deref(), &image.file_name);
    fs::write(&dest, &image.bytes)
        .await
        .map_err(|e| JlinkError::io(format!("writing {}", dest.display()), e))?;

    println!(
        "{} {} ({} bytes, {})",
        style("[OK]").green(),
        dest.display(),
        image.bytes.len(),
        image.release
    );
    Ok(())
}

/// Where to write the image: an explicit file, a directory, or the current directory
fn output_path(output: Option<&Path>, file_name: &str) -> PathBuf {
    match output {
        Some(path) if path.is_dir() => path.join(file_name),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(file_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn output_path_variants() {
        let temp = TempDir::new().unwrap();
        let name = "OpenJDK-jdk_x64_linux_hotspot_17_35.tar.gz";

        assert_eq!(output_path(None, name), PathBuf::from(name));
        assert_eq!(output_path(Some(temp.path()), name), temp.path().join(name));
        let file = temp.path().join("image.tar.gz");
        assert_eq!(output_path(Some(&file), name), file);
    }
}
