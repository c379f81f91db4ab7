//! Process-wide runtime context.
//!
//! `RuntimeContext` replaces a mutable "current version" singleton with an
//! explicit value: it is constructed exactly once at process startup and then
//! passed by reference through request handling. Nothing in it can be
//! reassigned after construction, so the single-writer-
//! at-init contract is enforced by ownership rather than by convention.

use crate::version::{Version, VersionError};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Deployment environment the process is running in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deployment {
    Production,
    Staging,
    Debug,
    /// An operator-defined environment name (e.g. a preview deployment).
    Custom(String),
}

impl Deployment {
    /// Map an environment name to a deployment. Unrecognized names become
    /// `Custom`, so this never fails.
    pub fn from_name(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "production" | "prod" => Deployment::Production,
            "staging" => Deployment::Staging,
            "debug" | "dev" => Deployment::Debug,
            _ => Deployment::Custom(s.to_string()),
        }
    }
}

impl FromStr for Deployment {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Deployment::from_name(s))
    }
}

impl fmt::Display for Deployment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Deployment::Production => f.write_str("production"),
            Deployment::Staging => f.write_str("staging"),
            Deployment::Debug => f.write_str("debug"),
            Deployment::Custom(name) => f.write_str(name),
        }
    }
}

/// Immutable per-process configuration: the application's current version, the
/// minimum client version it still serves, the deployment environment, and a
/// small string key-value store for values that must be readable anywhere a
/// `&RuntimeContext` reaches.
#[derive(Debug, Clone)]
pub struct RuntimeContext {
    current_version: Version,
    minimum_version: Version,
    deployment: Deployment,
    globals: HashMap<String, String>,
}

impl RuntimeContext {
    /// Create a runtime context.
    ///
    /// # Returns
    /// * `Ok(RuntimeContext)` if `minimum_version <= current_version`
    /// * `Err(VersionError::InvalidRange)` otherwise
    pub fn new(
        current_version: Version,
        minimum_version: Version,
        deployment: Deployment,
    ) -> Result<Self, VersionError> {
        if minimum_version > current_version {
            return Err(VersionError::InvalidRange {
                lower: minimum_version,
                upper: current_version,
            });
        }
        Ok(Self {
            current_version,
            minimum_version,
            deployment,
            globals: HashMap::new(),
        })
    }

    /// Load the runtime context from environment variables.
    ///
    /// * `APP_VERSION` - required, `X.Y.Z` or `vX.Y.Z`
    /// * `MIN_SUPPORTED_VERSION` - optional, defaults to `APP_VERSION`
    /// * `DEPLOYMENT` - optional, defaults to `production`
    pub fn from_env() -> Result<Self> {
        let current: Version = std::env::var("APP_VERSION")
            .context("APP_VERSION not set")?
            .parse()
            .context("APP_VERSION is not a valid version")?;

        let minimum: Version = match std::env::var("MIN_SUPPORTED_VERSION") {
            Ok(raw) => raw
                .parse()
                .context("MIN_SUPPORTED_VERSION is not a valid version")?,
            Err(_) => current,
        };

        let deployment = std::env::var("DEPLOYMENT")
            .map(|name| Deployment::from_name(&name))
            .unwrap_or(Deployment::Production);

        Self::new(current, minimum, deployment)
            .context("MIN_SUPPORTED_VERSION exceeds APP_VERSION")
    }

    /// Add a global key-value entry (builder-style, startup only).
    pub fn with_global(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.globals.insert(key.into(), value.into());
        self
    }

    /// The application's current version.
    pub fn current_version(&self) -> Version {
        self.current_version
    }

    /// The oldest client version still served.
    pub fn minimum_version(&self) -> Version {
        self.minimum_version
    }

    /// The deployment environment.
    pub fn deployment(&self) -> &Deployment {
        &self.deployment
    }

    /// Read a global string value by key.
    pub fn global(&self, key: &str) -> Option<&str> {
        self.globals.get(key).map(String::as_str)
    }

    /// Check a client's claimed version against the current version.
    ///
    /// # Returns
    /// * `Ok(())` if the claimed version is compatible
    /// * `Err(VersionError::Incompatible)` otherwise
    pub fn check_compatible(&self, claimed: &Version) -> Result<(), VersionError> {
        if claimed.is_compatible_with(&self.current_version) {
            Ok(())
        } else {
            Err(VersionError::Incompatible {
                claimed: *claimed,
                current: self.current_version,
            })
        }
    }

    /// Whether a version is at or above the minimum supported version.
    pub fn is_supported(&self, version: &Version) -> bool {
        *version >= self.minimum_version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn context() -> RuntimeContext {
        RuntimeContext::new(
            Version::new(2, 5, 0),
            Version::new(2, 0, 0),
            Deployment::Production,
        )
        .expect("valid context")
    }

    // ==================== Construction Tests ====================

    #[test]
    fn test_new_valid_range() {
        let cx = context();
        assert_eq!(cx.current_version(), Version::new(2, 5, 0));
        assert_eq!(cx.minimum_version(), Version::new(2, 0, 0));
        assert_eq!(cx.deployment(), &Deployment::Production);
    }

    #[test]
    fn test_new_rejects_minimum_above_current() {
        let result = RuntimeContext::new(
            Version::new(1, 0, 0),
            Version::new(2, 0, 0),
            Deployment::Debug,
        );
        assert!(matches!(result, Err(VersionError::InvalidRange { .. })));
    }

    #[test]
    fn test_new_allows_equal_versions() {
        let v = Version::new(1, 0, 0);
        assert!(RuntimeContext::new(v, v, Deployment::Debug).is_ok());
    }

    // ==================== Compatibility Tests ====================

    #[test]
    fn test_check_compatible_ok() {
        let cx = context();
        assert!(cx.check_compatible(&Version::new(2, 3, 9)).is_ok());
    }

    #[test]
    fn test_check_compatible_major_mismatch() {
        let cx = context();
        let err = cx.check_compatible(&Version::new(3, 0, 0)).unwrap_err();
        assert!(matches!(err, VersionError::Incompatible { .. }));
    }

    #[test]
    fn test_check_compatible_newer_minor() {
        let cx = context();
        assert!(cx.check_compatible(&Version::new(2, 6, 0)).is_err());
    }

    #[test]
    fn test_incompatible_error_reports_both_versions() {
        let cx = context();
        let message = cx
            .check_compatible(&Version::new(3, 0, 0))
            .unwrap_err()
            .to_string();
        assert!(message.contains("3.0.0"));
        assert!(message.contains("2.5.0"));
    }

    #[test]
    fn test_is_supported() {
        let cx = context();
        assert!(cx.is_supported(&Version::new(2, 0, 0)));
        assert!(cx.is_supported(&Version::new(2, 4, 1)));
        assert!(!cx.is_supported(&Version::new(1, 9, 9)));
    }

    // ==================== Globals Tests ====================

    #[test]
    fn test_globals_read_back() {
        let cx = context()
            .with_global("support-url", "https://example.com/help")
            .with_global("region", "eu");
        assert_eq!(cx.global("support-url"), Some("https://example.com/help"));
        assert_eq!(cx.global("region"), Some("eu"));
        assert_eq!(cx.global("missing"), None);
    }

    // ==================== Deployment Tests ====================

    #[test]
    fn test_deployment_parsing() {
        assert_eq!("production".parse(), Ok(Deployment::Production));
        assert_eq!("prod".parse(), Ok(Deployment::Production));
        assert_eq!("Staging".parse(), Ok(Deployment::Staging));
        assert_eq!("dev".parse(), Ok(Deployment::Debug));
        assert_eq!(
            "preview-42".parse(),
            Ok(Deployment::Custom("preview-42".to_string()))
        );
    }

    #[test]
    fn test_deployment_display() {
        assert_eq!(Deployment::Production.to_string(), "production");
        assert_eq!(Deployment::Custom("qa".to_string()).to_string(), "qa");
    }

    // ==================== Environment Tests ====================

    #[test]
    #[serial]
    fn test_from_env_full() {
        std::env::set_var("APP_VERSION", "2.5.0");
        std::env::set_var("MIN_SUPPORTED_VERSION", "2.1.0");
        std::env::set_var("DEPLOYMENT", "staging");

        let cx = RuntimeContext::from_env().expect("should load");
        assert_eq!(cx.current_version(), Version::new(2, 5, 0));
        assert_eq!(cx.minimum_version(), Version::new(2, 1, 0));
        assert_eq!(cx.deployment(), &Deployment::Staging);

        std::env::remove_var("APP_VERSION");
        std::env::remove_var("MIN_SUPPORTED_VERSION");
        std::env::remove_var("DEPLOYMENT");
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        std::env::set_var("APP_VERSION", "v1.2.3");
        std::env::remove_var("MIN_SUPPORTED_VERSION");
        std::env::remove_var("DEPLOYMENT");

        let cx = RuntimeContext::from_env().expect("should load");
        assert_eq!(cx.minimum_version(), cx.current_version());
        assert_eq!(cx.deployment(), &Deployment::Production);

        std::env::remove_var("APP_VERSION");
    }

    #[test]
    #[serial]
    fn test_from_env_missing_version() {
        std::env::remove_var("APP_VERSION");
        let err = RuntimeContext::from_env().unwrap_err();
        assert!(err.to_string().contains("APP_VERSION"));
    }

    #[test]
    #[serial]
    fn test_from_env_malformed_version() {
        std::env::set_var("APP_VERSION", "two.five.zero");
        let result = RuntimeContext::from_env();
        assert!(result.is_err());
        std::env::remove_var("APP_VERSION");
    }
}
