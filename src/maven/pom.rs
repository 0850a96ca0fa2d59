//! The subset of a Maven POM needed to follow dependencies

use crate::maven::coordinate::ArtifactCoordinate;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::warn;

/// Nesting limit for `${...}` expansion
const MAX_EXPANSIONS: usize = 8;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Pom {
    #[serde(rename = "groupId")]
    pub group_id: Option<String>,
    #[serde(rename = "artifactId")]
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub parent: Option<PomParent>,
    pub properties: HashMap<String, String>,
    pub dependencies: PomDependencies,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PomParent {
    #[serde(rename = "groupId")]
    pub group_id: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PomDependencies {
    pub dependency: Vec<PomDependency>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PomDependency {
    #[serde(rename = "groupId")]
    pub group_id: String,
    #[serde(rename = "artifactId")]
    pub artifact_id: String,
    pub version: Option<String>,
    pub scope: Option<String>,
}

impl Pom {
    pub fn parse(body: &[u8]) -> Result<Self, quick_xml::DeError> {
        let text = String::from_utf8_lossy(body);
        quick_xml::de::from_str(&text)
    }

    /// Dependencies needed at run time, with placeholders expanded
    ///
    /// `test` scoped entries are dropped. Entries whose coordinate is still
    /// unusable after expansion (usually a version managed by a parent POM)
    /// are skipped with a warning.
    pub fn runtime_dependencies(&self) -> Vec<ArtifactCoordinate> {
        self.dependencies
            .dependency
            .iter()
            .filter(|dep| dep.scope.as_deref() != Some("test"))
            .filter_map(|dep| {
                let version = dep.version.as_deref().and_then(|v| self.expand(v));
                let group = self.expand(&dep.group_id);
                let coordinate = match (group, version) {
                    (Some(group), Some(version)) => {
                        ArtifactCoordinate::new(group, dep.artifact_id.clone(), version).ok()
                    }
                    _ => None,
                };
                if coordinate.is_none() {
                    warn!(
                        "Skipping dependency {}:{} with unresolved version {:?}",
                        dep.group_id, dep.artifact_id, dep.version
                    );
                }
                coordinate
            })
            .collect()
    }

    /// Expand `${name}` references, or `None` when one cannot be resolved
    pub fn expand(&self, value: &str) -> Option<String> {
        let mut expanded = value.trim().to_string();
        for _ in 0..MAX_EXPANSIONS {
            let Some(start) = expanded.find("${") else {
                return Some(expanded);
            };
            let end = start + expanded[start..].find('}')?;
            let replacement = self.property(&expanded[start + 2..end])?;
            expanded.replace_range(start..=end, &replacement);
        }
        None
    }

    fn property(&self, name: &str) -> Option<String> {
        let parent = self.parent.as_ref();
        match name {
            "project.version" | "pom.version" | "version" => self
                .version
                .clone()
                .or_else(|| parent.and_then(|p| p.version.clone())),
            "project.groupId" | "pom.groupId" | "groupId" => self
                .group_id
                .clone()
                .or_else(|| parent.and_then(|p| p.group_id.clone())),
            "project.parent.version" => parent.and_then(|p| p.version.clone()),
            "project.parent.groupId" => parent.and_then(|p| p.group_id.clone()),
            _ => self.properties.get(name).map(|v| v.trim().to_string()),
        }
    }
}
