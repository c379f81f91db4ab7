//! Semantic version model for view-model wire formats.
//!
//! A `Version` is the three-part (major.minor.patch) tag that travels in the
//! `x-viewmodel-version` header on every request and response. Compatibility
//! between a client's claimed version and the server's current version follows
//! the rule in [`Version::is_compatible_with`]: same major, client minor no
//! greater than server minor, patch ignored.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Errors raised by version parsing, header handling, and compatibility checks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    /// The version string did not match `X.Y.Z` (or `vX.Y.Z`).
    #[error("malformed version string: '{input}'")]
    Malformed { input: String },

    /// The dedicated version header was absent from a request/response that
    /// requires compatibility checking.
    #[error("missing version header '{header}'")]
    MissingHeader { header: &'static str },

    /// The claimed version is not compatible with the current version.
    /// Maps to a client-visible "please update" response at the transport
    /// boundary rather than a crash.
    #[error("version {claimed} is not compatible with current version {current}")]
    Incompatible { claimed: Version, current: Version },

    /// A version range or runtime context was constructed with its bounds
    /// reversed (e.g. `introduced > removed`).
    #[error("invalid version range: {lower} > {upper}")]
    InvalidRange { lower: Version, upper: Version },
}

/// A three-part semantic version.
///
/// Total ordering compares major, then minor, then patch (the derived `Ord`
/// over the declared field order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    /// The initial release version, `1.0.0`.
    pub const INITIAL: Version = Version::new(1, 0, 0);

    /// Create a version from an integer triple.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Check whether `self` (a client's claimed version) is compatible with
    /// `server` (the server's current version).
    ///
    /// Compatibility holds iff the major versions match and the client's minor
    /// version does not exceed the server's. Patch versions are ignored: a
    /// client two minor versions behind is compatible, a client on a different
    /// major version or ahead of the server's minor version is not.
    pub fn is_compatible_with(&self, server: &Version) -> bool {
        self.major == server.major && self.minor <= server.minor
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = VersionError;

    /// Parse `"X.Y.Z"` or `"vX.Y.Z"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || VersionError::Malformed {
            input: s.to_string(),
        };

        let trimmed = s.strip_prefix('v').unwrap_or(s);
        let mut parts = trimmed.split('.');

        let mut next_part = |parts: &mut std::str::Split<'_, char>| -> Result<u32, VersionError> {
            let part = parts.next().ok_or_else(malformed)?;
            // Reject empty parts and embedded signs ("+1", "-1") that u32's
            // parser would otherwise tolerate or misreport.
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed());
            }
            part.parse::<u32>().map_err(|_| malformed())
        };

        let major = next_part(&mut parts)?;
        let minor = next_part(&mut parts)?;
        let patch = next_part(&mut parts)?;

        if parts.next().is_some() {
            return Err(malformed());
        }

        Ok(Version::new(major, minor, patch))
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
