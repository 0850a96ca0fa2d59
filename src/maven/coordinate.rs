//! Maven artifact coordinates

use crate::error::{JlinkError, JlinkResult};
use std::fmt;
use std::str::FromStr;

/// A `group:artifact:version` triple
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArtifactCoordinate {
    pub group: String,
    pub artifact: String,
    pub version: String,
}

impl ArtifactCoordinate {
    pub fn new(
        group: impl Into<String>,
        artifact: impl Into<String>,
        version: impl Into<String>,
    ) -> JlinkResult<Self> {
        let coordinate = Self {
            group: group.into(),
            artifact: artifact.into(),
            version: version.into(),
        };
        let valid = [&coordinate.group, &coordinate.artifact, &coordinate.version]
            .iter()
            .all(|part| is_coordinate_part(part));
        if valid {
            Ok(coordinate)
        } else {
            Err(JlinkError::InvalidCoordinate(coordinate.to_string()))
        }
    }

    /// `<artifact>-<version>.jar`
    pub fn jar_file_name(&self) -> String {
        format!("{}-{}.jar", self.artifact, self.version)
    }

    /// `<artifact>-<version>.pom`
    pub fn pom_file_name(&self) -> String {
        format!("{}-{}.pom", self.artifact, self.version)
    }

    /// Directory of this coordinate under a repository root
    pub fn base_url(&self, repository: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            repository.trim_end_matches('/'),
            self.group.replace('.', "/"),
            self.artifact,
            self.version
        )
    }

    pub fn jar_url(&self, repository: &str) -> String {
        format!("{}/{}", self.base_url(repository), self.jar_file_name())
    }

    pub fn pom_url(&self, repository: &str) -> String {
        format!("{}/{}", self.base_url(repository), self.pom_file_name())
    }
}

fn is_coordinate_part(part: &str) -> bool {
    !part.is_empty()
        && part
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

impl FromStr for ArtifactCoordinate {
    type Err = JlinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [group, artifact, version] => Self::new(*group, *artifact, *version)
                .map_err(|_| JlinkError::InvalidCoordinate(s.to_string())),
            _ => Err(JlinkError::InvalidCoordinate(s.to_string())),
        }
    }
}

impl fmt::Display for ArtifactCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)
    }
}
