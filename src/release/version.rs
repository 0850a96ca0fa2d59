//! Version tokens and release ordering
//!
//! A token is either a strict numeric version (`11`, `11.0.8`, `11.0.8+10`)
//! or one of the aliases `lts`, `ga`, `ea`, which map to operator-configured
//! major versions.

use crate::config::schema::ReleaseConfig;
use crate::error::{JlinkError, JlinkResult};
use std::cmp::Ordering;
use std::fmt;

/// First major version that ships jlink
pub const MIN_MAJOR: u32 = 9;

/// Release channel of the index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReleaseChannel {
    /// General availability
    Ga,
    /// Early access
    Ea,
}

impl ReleaseChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseChannel::Ga => "ga",
            ReleaseChannel::Ea => "ea",
        }
    }
}

/// A validated numeric version token
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JavaVersion {
    raw: String,
    major: u32,
}

impl JavaVersion {
    /// Parse a token of the form `MAJOR(.MINOR...)?(+BUILD(.MINOR...)?)?`
    pub fn parse(token: &str) -> JlinkResult<Self> {
        let invalid = || JlinkError::InvalidVersion(token.to_string());

        let (base, build) = match token.split_once('+') {
            Some((base, build)) => (base, Some(build)),
            None => (token, None),
        };
        if !is_numeric_sequence(base) || !build.map_or(true, is_numeric_sequence) {
            return Err(invalid());
        }

        let major = major_version(token).ok_or_else(invalid)?;
        if major < MIN_MAJOR {
            return Err(invalid());
        }

        Ok(Self {
            raw: token.to_string(),
            major,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn major(&self) -> u32 {
        self.major
    }

    /// Whether the token pins a build number
    pub fn has_build(&self) -> bool {
        self.raw.contains('+')
    }

    /// Whether a release version satisfies this token
    ///
    /// Tokens with a build must match exactly, tokens without one match any
    /// build of the same base version.
    pub fn matches(&self, release_version: &str) -> bool {
        if self.has_build() {
            self.raw == release_version
        } else {
            base_version(release_version) == self.raw
        }
    }
}

impl fmt::Display for JavaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// What the release index should be asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionQuery {
    /// A concrete version, optionally pinned to a build
    Exact(JavaVersion),
    /// The newest release of a major version line
    Latest { major: u32, channel: ReleaseChannel },
}

impl VersionQuery {
    pub fn major(&self) -> u32 {
        match self {
            VersionQuery::Exact(version) => version.major(),
            VersionQuery::Latest { major, .. } => *major,
        }
    }
}

impl fmt::Display for VersionQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionQuery::Exact(version) => write!(f, "{}", version),
            VersionQuery::Latest { major, channel } => {
                write!(f, "latest {} {}", channel.as_str(), major)
            }
        }
    }
}

/// Major versions behind the `lts`, `ga` and `ea` aliases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionAliases {
    pub lts: u32,
    pub ga: u32,
    pub ea: u32,
}

impl From<&ReleaseConfig> for VersionAliases {
    fn from(config: &ReleaseConfig) -> Self {
        Self {
            lts: config.lts,
            ga: config.ga,
            ea: config.ea,
        }
    }
}

/// Turn a version token into a release query
pub fn resolve(token: &str, aliases: &VersionAliases) -> JlinkResult<VersionQuery> {
    let (major, channel) = match token {
        "lts" => (aliases.lts, ReleaseChannel::Ga),
        "ga" => (aliases.ga, ReleaseChannel::Ga),
        "ea" => (aliases.ea, ReleaseChannel::Ea),
        _ => return JavaVersion::parse(token).map(VersionQuery::Exact),
    };

    if major < MIN_MAJOR {
        return Err(JlinkError::InvalidVersion(format!(
            "{} (configured major {})",
            token, major
        )));
    }
    Ok(VersionQuery::Latest { major, channel })
}

/// Major version of a version string (`11.0.8+10` -> 11, `17+35` -> 17)
pub fn major_version(version: &str) -> Option<u32> {
    version
        .split(['.', '+'])
        .next()
        .and_then(|major| major.parse().ok())
}

/// Version without its build part (`11.0.8+10` -> `11.0.8`)
pub fn base_version(version: &str) -> &str {
    version.split_once('+').map_or(version, |(base, _)| base)
}

/// Order two releases of the same base version by their build part
///
/// The build part (text after the last `+`, or the whole string) is compared
/// as a dot-separated integer sequence, the shorter one padded with zeros.
/// Components that are not numbers count as zero.
pub fn compare_build(a: &str, b: &str) -> Ordering {
    let build = |v: &str| -> Vec<u64> {
        let part = v.rsplit_once('+').map_or(v, |(_, build)| build);
        part.split('.').map(|n| n.parse().unwrap_or(0)).collect()
    };

    let (x, y) = (build(a), build(b));
    let len = x.len().max(y.len());
    (0..len)
        .map(|i| {
            let l = x.get(i).copied().unwrap_or(0);
            let r = y.get(i).copied().unwrap_or(0);
            l.cmp(&r)
        })
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// `N(.N)*` where the first component is non-zero, components have no
/// leading zeros, and the sequence does not end in a zero component.
fn is_numeric_sequence(s: &str) -> bool {
    let parts: Vec<&str> = s.split('.').collect();
    let well_formed = parts.iter().enumerate().all(|(i, part)| {
        let digits = !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
        let canonical = *part == "0" || !part.starts_with('0');
        digits && canonical && (i > 0 || *part != "0")
    });
    well_formed && parts.last().is_some_and(|last| *last != "0")
}
