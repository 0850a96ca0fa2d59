//! Runtime requests and their validation
//!
//! Every field is checked before any network traffic happens.

use crate::error::{JlinkError, JlinkResult};
use crate::jlink::BASE_MODULE;
use crate::maven::ArtifactCoordinate;
use crate::platform::{Arch, Endian, Implementation, Os};
use crate::release::version::{self, VersionAliases, VersionQuery};
use serde::{Deserialize, Serialize};

/// A runtime request as received from a client
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeRequest {
    pub arch: String,
    #[serde(rename = "os")]
    pub platform: String,
    pub version: String,
    pub implementation: Option<String>,
    pub endian: Option<String>,
    pub modules: Vec<String>,
    pub artifacts: Vec<String>,
}

/// A request whose fields all parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub arch: Arch,
    pub platform: Os,
    pub implementation: Implementation,
    pub endian: Endian,
    pub version: VersionQuery,
    pub modules: Vec<String>,
    pub artifacts: Vec<ArtifactCoordinate>,
}

impl RuntimeRequest {
    /// Validate in the order clients have always seen errors reported
    pub fn validate(
        &self,
        aliases: &VersionAliases,
        maven_enabled: bool,
    ) -> JlinkResult<ValidatedRequest> {
        if !self.artifacts.is_empty() && !maven_enabled {
            return Err(JlinkError::MavenDisabled);
        }

        let platform: Os = self.platform.parse()?;
        if platform.as_str() != self.platform {
            return Err(JlinkError::InvalidRequest {
                field: "platform",
                value: self.platform.clone(),
            });
        }
        let arch: Arch = self.arch.parse()?;

        let artifacts = self
            .artifacts
            .iter()
            .map(|artifact| artifact.parse())
            .collect::<JlinkResult<Vec<ArtifactCoordinate>>>()?;

        let mut modules = Vec::with_capacity(self.modules.len().max(1));
        for module in &self.modules {
            if !is_module_name(module) {
                return Err(JlinkError::InvalidRequest {
                    field: "module",
                    value: module.clone(),
                });
            }
            if !modules.contains(module) {
                modules.push(module.clone());
            }
        }
        if modules.is_empty() {
            modules.push(BASE_MODULE.to_string());
        }

        let endian = match self.endian.as_deref() {
            None | Some("") => arch.default_endian(),
            Some(endian) => endian.parse()?,
        };

        let implementation = match self.implementation.as_deref() {
            None | Some("") => Implementation::default(),
            Some(implementation) => implementation.parse()?,
        };

        let version = version::resolve(&self.version, aliases)?;

        Ok(ValidatedRequest {
            arch,
            platform,
            implementation,
            endian,
            version,
            modules,
            artifacts,
        })
    }
}

/// Split a comma-separated query parameter, dropping empty items
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_module_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}
