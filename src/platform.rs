//! Platform vocabulary shared by the release index, the runtime store and jlink
//!
//! Values use the spelling of the Adoptium API (`mac`, `x64`, `hotspot`).

use crate::error::{JlinkError, JlinkResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Operating system of a runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    Linux,
    Windows,
    Mac,
    Solaris,
    Aix,
}

impl Os {
    /// All supported operating systems
    pub const ALL: [Os; 5] = [Os::Linux, Os::Windows, Os::Mac, Os::Solaris, Os::Aix];

    /// Detect the operating system of this process
    pub fn detect() -> Option<Self> {
        match std::env::consts::OS {
            "linux" => Some(Os::Linux),
            "windows" => Some(Os::Windows),
            "macos" => Some(Os::Mac),
            "solaris" | "illumos" => Some(Os::Solaris),
            "aix" => Some(Os::Aix),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Os::Linux => "linux",
            Os::Windows => "windows",
            Os::Mac => "mac",
            Os::Solaris => "solaris",
            Os::Aix => "aix",
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Os {
    type Err = JlinkError;

    fn from_str(s: &str) -> JlinkResult<Self> {
        match s {
            "linux" => Ok(Os::Linux),
            "windows" => Ok(Os::Windows),
            // Go and Rust spellings of macOS are accepted for LOCAL_PLATFORM
            "mac" | "darwin" | "macos" => Ok(Os::Mac),
            "solaris" => Ok(Os::Solaris),
            "aix" => Ok(Os::Aix),
            other => Err(JlinkError::InvalidRequest {
                field: "platform",
                value: other.to_string(),
            }),
        }
    }
}

/// CPU architecture of a runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    X64,
    X32,
    Ppc64,
    S390x,
    Ppc64le,
    Aarch64,
    Arm,
}

impl Arch {
    /// Detect the architecture of this process
    pub fn detect() -> Option<Self> {
        match std::env::consts::ARCH {
            "x86_64" => Some(Arch::X64),
            "x86" => Some(Arch::X32),
            "aarch64" => Some(Arch::Aarch64),
            "arm" => Some(Arch::Arm),
            "powerpc64" if cfg!(target_endian = "little") => Some(Arch::Ppc64le),
            "powerpc64" => Some(Arch::Ppc64),
            "s390x" => Some(Arch::S390x),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::X64 => "x64",
            Arch::X32 => "x32",
            Arch::Ppc64 => "ppc64",
            Arch::S390x => "s390x",
            Arch::Ppc64le => "ppc64le",
            Arch::Aarch64 => "aarch64",
            Arch::Arm => "arm",
        }
    }

    /// Byte order used when the caller does not ask for one
    pub fn default_endian(&self) -> Endian {
        match self {
            Arch::Ppc64 | Arch::S390x => Endian::Big,
            _ => Endian::Little,
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Arch {
    type Err = JlinkError;

    fn from_str(s: &str) -> JlinkResult<Self> {
        match s {
            "x64" => Ok(Arch::X64),
            "x32" => Ok(Arch::X32),
            "ppc64" => Ok(Arch::Ppc64),
            "s390x" => Ok(Arch::S390x),
            "ppc64le" => Ok(Arch::Ppc64le),
            "aarch64" => Ok(Arch::Aarch64),
            "arm" => Ok(Arch::Arm),
            other => Err(JlinkError::InvalidRequest {
                field: "architecture",
                value: other.to_string(),
            }),
        }
    }
}

/// JVM implementation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Implementation {
    #[default]
    Hotspot,
    Openj9,
}

impl Implementation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Implementation::Hotspot => "hotspot",
            Implementation::Openj9 => "openj9",
        }
    }
}

impl fmt::Display for Implementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Implementation {
    type Err = JlinkError;

    fn from_str(s: &str) -> JlinkResult<Self> {
        match s {
            "hotspot" => Ok(Implementation::Hotspot),
            "openj9" => Ok(Implementation::Openj9),
            other => Err(JlinkError::InvalidRequest {
                field: "implementation",
                value: other.to_string(),
            }),
        }
    }
}

/// Byte order of the generated image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endian::Little => "little",
            Endian::Big => "big",
        }
    }
}

impl fmt::Display for Endian {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Endian {
    type Err = JlinkError;

    fn from_str(s: &str) -> JlinkResult<Self> {
        match s {
            "little" => Ok(Endian::Little),
            "big" => Ok(Endian::Big),
            other => Err(JlinkError::InvalidRequest {
                field: "endian",
                value: other.to_string(),
            }),
        }
    }
}
