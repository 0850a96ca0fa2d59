//! Configuration management for jlink-online

pub mod schema;

pub use schema::Config;

use crate::error::{JlinkError, JlinkResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("jlink-online")
            .join("config.toml")
    }

    /// Load configuration, using defaults if the file does not exist
    pub async fn load(&self) -> JlinkResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> JlinkResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| JlinkError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| JlinkError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Save configuration to file
    pub async fn save(&self, config: &Config) -> JlinkResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                JlinkError::io(format!("creating directory {}", parent.display()), e)
            })?;
        }

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            JlinkError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Ensure the cache and scratch directories exist
    pub async fn ensure_dirs(config: &Config) -> JlinkResult<()> {
        let mut dirs = vec![config.runtime.cache_dir.clone(), config.runtime.tmp_dir.clone()];
        if let Some(parent) = config.release.metadata_file.parent() {
            dirs.push(parent.to_path_buf());
        }

        for dir in &dirs {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| JlinkError::io(format!("creating directory {}", dir.display()), e))?;
        }
        Ok(())
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Apply the environment variables understood by the hosted service
    pub fn apply_env_overrides(&mut self) -> JlinkResult<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable source
    ///
    /// Recognized: `PORT`, `MAVEN_CENTRAL`, `LOCAL_ARCH`, `LOCAL_PLATFORM`,
    /// `RT_CACHE`, `TMP`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> JlinkResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let invalid = |name: &str, reason: String| JlinkError::ConfigInvalid {
            path: PathBuf::from(format!("${}", name)),
            reason,
        };

        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| invalid("PORT", format!("'{}' is not a port number", port)))?;
        }
        if let Some(flag) = lookup("MAVEN_CENTRAL") {
            self.maven.enabled = parse_bool(&flag)
                .ok_or_else(|| invalid("MAVEN_CENTRAL", format!("'{}' is not a boolean", flag)))?;
        }
        if let Some(arch) = lookup("LOCAL_ARCH") {
            self.runtime.local_arch = arch
                .parse()
                .map_err(|e: JlinkError| invalid("LOCAL_ARCH", e.to_string()))?;
        }
        if let Some(platform) = lookup("LOCAL_PLATFORM") {
            self.runtime.local_platform = platform
                .parse()
                .map_err(|e: JlinkError| invalid("LOCAL_PLATFORM", e.to_string()))?;
        }
        if let Some(cache) = lookup("RT_CACHE") {
            self.runtime.cache_dir = PathBuf::from(cache);
        }
        if let Some(tmp) = lookup("TMP") {
            self.runtime.tmp_dir = PathBuf::from(tmp);
        }
        Ok(())
    }
}

/// Boolean spellings accepted for flag variables
fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Arch, Os};
    use serial_test::serial;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_default_when_missing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nonexistent.toml");
        let manager = ConfigManager::with_path(path);

        let config = manager.load().await.unwrap();
        assert_eq!(config.server.port, 80);
    }

    #[tokio::test]
    async fn save_and_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        let manager = ConfigManager::with_path(path);

        let mut config = Config::default();
        config.server.port = 8080;
        config.maven.enabled = true;

        manager.save(&config).await.unwrap();
        let loaded = manager.load().await.unwrap();

        assert_eq!(loaded.server.port, 8080);
        assert!(loaded.maven.enabled);
    }

    #[tokio::test]
    async fn invalid_toml_reports_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = \"eighty\"\n").unwrap();

        let err = ConfigManager::with_path(path.clone()).load().await.unwrap_err();
        assert!(matches!(err, JlinkError::ConfigInvalid { path: p, .. } if p == path));
    }

    #[test]
    fn overrides_apply() {
        let vars: HashMap<&str, &str> = [
            ("PORT", "8080"),
            ("MAVEN_CENTRAL", "true"),
            ("LOCAL_ARCH", "aarch64"),
            ("LOCAL_PLATFORM", "darwin"),
            ("RT_CACHE", "/srv/runtimes"),
            ("TMP", "/srv/tmp"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_overrides(|name| vars.get(name).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.server.port, 8080);
        assert!(config.maven.enabled);
        assert_eq!(config.runtime.local_arch, Arch::Aarch64);
        assert_eq!(config.runtime.local_platform, Os::Mac);
        assert_eq!(config.runtime.cache_dir, PathBuf::from("/srv/runtimes"));
        assert_eq!(config.runtime.tmp_dir, PathBuf::from("/srv/tmp"));
    }

    #[test]
    fn invalid_maven_flag_rejected() {
        let mut config = Config::default();
        let err = config
            .apply_overrides(|name| (name == "MAVEN_CENTRAL").then(|| "maybe".to_string()))
            .unwrap_err();
        assert!(matches!(err, JlinkError::ConfigInvalid { .. }));
    }

    #[test]
    #[serial]
    fn env_overrides_read_process_environment() {
        std::env::set_var("PORT", "9090");
        let mut config = Config::default();
        let result = config.apply_env_overrides();
        std::env::remove_var("PORT");

        result.unwrap();
        assert_eq!(config.server.port, 9090);
    }
}
