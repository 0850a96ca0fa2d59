//! Error types for jlink-online
//!
//! All modules use `JlinkResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for jlink-online operations
pub type JlinkResult<T> = Result<T, JlinkError>;

const HTTP_STATUS_PREFIX: &str = "Abnormal HTTP status code: ";

/// All errors that can occur while building a runtime image
#[derive(Error, Debug)]
pub enum JlinkError {
    // Request errors
    #[error("Invalid Java version: {0}")]
    InvalidVersion(String),

    #[error("Invalid artifact coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("Invalid {field}: {value}")]
    InvalidRequest { field: &'static str, value: String },

    #[error("Maven Central integration is disabled")]
    MavenDisabled,

    // Release errors
    #[error("No {implementation} release {version} for {platform}/{arch}")]
    NotFound {
        arch: String,
        platform: String,
        implementation: String,
        version: String,
    },

    #[error("Failed to fetch {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    // Dependency errors
    #[error("Cyclic artifact dependency: {0}")]
    CyclicDependency(String),

    // Build errors
    #[error("jlink failed: {reason}")]
    LinkFailed { reason: String, output: String },

    #[error("Archive failed for {path}: {reason}")]
    ArchiveFailed { path: PathBuf, reason: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl JlinkError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a fetch error for a URL
    pub fn fetch(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::FetchFailed {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a fetch error for a non-200 HTTP status
    pub fn http_status(url: impl Into<String>, status: impl std::fmt::Display) -> Self {
        Self::fetch(url, format!("{}{}", HTTP_STATUS_PREFIX, status))
    }

    /// Whether the server answered 404
    pub fn is_missing_resource(&self) -> bool {
        matches!(self, Self::FetchFailed { reason, .. }
            if reason.strip_prefix(HTTP_STATUS_PREFIX).is_some_and(|s| s.starts_with("404")))
    }

    /// Create a link error without tool output
    pub fn link_failed(reason: impl Into<String>) -> Self {
        Self::LinkFailed {
            reason: reason.into(),
            output: String::new(),
        }
    }

    /// Create an archive error for a path
    pub fn archive(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::ArchiveFailed {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Short, stable reason string returned to HTTP clients.
    ///
    /// Details stay in the logs.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::InvalidVersion(_) => "Invalid Java version",
            Self::InvalidCoordinate(_) => "Invalid artifact",
            Self::InvalidRequest { field, .. } => match *field {
                "architecture" => {
                    "Valid architectures: [x64, x32, ppc64, s390x, ppc64le, aarch64, arm]"
                }
                "platform" => "Valid operating systems: [windows, linux, mac, solaris, aix]",
                "implementation" => "Valid implementation types: [hotspot, openj9]",
                "endian" => "Valid endian types: [little, big]",
                "module" => "Invalid module",
                _ => "Invalid request",
            },
            Self::MavenDisabled => "Maven Central integration is disabled",
            Self::NotFound { .. } => "Failed to find runtime",
            Self::FetchFailed { .. } => "Failed to download",
            Self::CyclicDependency(_) => "Cyclic artifact dependency",
            Self::LinkFailed { .. } => "Failed to generate runtime",
            Self::ArchiveFailed { .. } => "Failed to package runtime",
            _ => "Internal error",
        }
    }

    /// Whether the failure is reported to HTTP clients as a 4xx
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            Self::Io { .. }
                | Self::Json(_)
                | Self::TomlParse(_)
                | Self::TomlSerialize(_)
                | Self::ConfigInvalid { .. }
                | Self::Internal(_)
        )
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::InvalidVersion(_) => {
                Some("Use a version such as 11, 11.0.8, 11.0.8+10, or one of: lts, ga, ea")
            }
            Self::InvalidCoordinate(_) => Some("Artifacts use the form group:artifact:version"),
            Self::MavenDisabled => Some("Set maven.enabled = true or MAVEN_CENTRAL=true"),
            Self::NotFound { .. } => Some("Run: jlink-online releases refresh"),
            _ => None,
        }
    }
}
