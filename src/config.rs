//! Environment-variable configuration.
use log::LevelFilter;
use secrecy::SecretString;
use std::env;

use crate::{Result, error::DepmendError};

/// Default remediation-service API base URL.
pub const DEFAULT_API_URL: &str = "https://api.depmend.dev";
/// Default package-registry base URL for pip installs.
pub const DEFAULT_PKG_URL: &str = "https://pkg.depmend.dev";
/// Default Python interpreter used for pip subcommands.
pub const DEFAULT_PYTHON_PATH: &str = "python";

/// Process-wide configuration, loaded once at startup and passed into each
/// component's constructor.
#[derive(Debug, Clone)]
pub struct Config {
    /// Remediation-service API key. Sensitive: exposed only for HTTP basic
    /// auth and pip index-URL construction, never logged.
    pub api_key: SecretString,
    /// Remediation-service base URL.
    pub api_url: String,
    /// Package-registry base URL for pip installs.
    pub pkg_url: String,
    /// Log verbosity.
    pub log_level: LevelFilter,
    /// Default Python interpreter for the pip subcommand.
    pub python_path: String,
    /// Default for the --dry-run flag.
    pub dry_run: bool,
    /// Default for the --use-alias flag.
    pub use_alias: bool,
}

impl Config {
    /// Load configuration from process environment variables.
    /// `DEPMEND_API_KEY` is required; everything else has a default.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an injectable variable lookup.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let api_key = lookup("DEPMEND_API_KEY")
            .filter(|key| !key.is_empty())
            .ok_or_else(|| DepmendError::missing_env("DEPMEND_API_KEY"))?;

        let api_url = lookup("DEPMEND_API_URL")
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let pkg_url = lookup("DEPMEND_PKG_URL")
            .unwrap_or_else(|| DEFAULT_PKG_URL.to_string());

        let log_level = match lookup("LOG_LEVEL").as_deref() {
            Some("error") => LevelFilter::Error,
            Some("warn") => LevelFilter::Warn,
            Some("debug") => LevelFilter::Debug,
            _ => LevelFilter::Info,
        };

        let python_path = lookup("PYTHON_PATH")
            .unwrap_or_else(|| DEFAULT_PYTHON_PATH.to_string());

        Ok(Self {
            api_key: SecretString::from(api_key),
            api_url,
            pkg_url,
            log_level,
            python_path,
            dry_run: lookup_bool(&lookup, "DRY_RUN", true),
            use_alias: lookup_bool(&lookup, "USE_ALIAS", true),
        })
    }
}

fn lookup_bool(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: bool,
) -> bool {
    match lookup(name) {
        Some(value) => {
            matches!(value.to_ascii_lowercase().as_str(), "true" | "1")
        }
        None => default,
    }
}
