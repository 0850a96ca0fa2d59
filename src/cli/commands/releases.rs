//! Releases command - resolve versions and rebuild the metadata cache

use crate::cli::args::{OutputFormat, ReleasesAction, ReleasesArgs};
use crate::config::{Config, ConfigManager};
use crate::error::JlinkResult;
use crate::platform::{Arch, Implementation, Os};
use crate::release::{version, ReleaseDescriptor, VersionAliases};
use crate::service::RuntimeService;
use console::style;

/// Execute the releases command
pub async fn execute(args: ReleasesArgs, config: &Config) -> JlinkResult<()> {
    match args.action {
        ReleasesAction::Lookup {
            java_version,
            arch,
            os,
            implementation,
            format,
        } => {
            let arch: Arch = arch.parse()?;
            let platform: Os = os.parse()?;
            let implementation: Implementation = implementation.parse()?;
            let query = version::resolve(&java_version, &VersionAliases::from(&config.release))?;

            ConfigManager::ensure_dirs(config).await?;
            let service = RuntimeService::new(config).await?;
            let release = service
                .releases()
                .lookup(arch, platform, implementation, &query)
                .await?;
            print_release(&release, format)
        }
        ReleasesAction::Refresh { majors } => {
            let majors = if majors.is_empty() {
                config.release.refresh_majors.clone()
            } else {
                majors
            };

            ConfigManager::ensure_dirs(config).await?;
            let service = RuntimeService::new(config).await?;
            let count = service.releases().refresh(&majors).await?;
            println!(
                "{} indexed {} release entries for majors {:?}",
                style("✓").green(),
                count,
                majors
            );
            Ok(())
        }
    }
}

fn print_release(release: &ReleaseDescriptor, format: OutputFormat) -> JlinkResult<()> {
    match format {
        OutputFormat::Table => {
            println!("{:<16} {}", style("Version").bold(), release.version);
            println!("{:<16} {}", style("Implementation").bold(), release.implementation);
            println!("{:<16} {}/{}", style("Platform").bold(), release.platform, release.arch);
            println!("{:<16} {}", style("Archive").bold(), release.file_name);
            println!("{:<16} {}", style("Link").bold(), release.link);
            if let Some(checksum) = &release.checksum {
                println!("{:<16} {}", style("SHA-256").bold(), checksum);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(release)?),
        OutputFormat::Plain => println!("{}", release.link),
    }
    Ok(())
}
