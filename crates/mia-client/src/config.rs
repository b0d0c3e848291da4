//! Client configuration.
//!
//! Resolution order: explicit overrides (CLI flags), then `MIA_*` environment
//! variables, then the optional TOML file, then built-in defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use mia_core::{MiaError, MiaResult};
use serde::Deserialize;
use tracing::debug;

/// Default service URL.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_API_URL: &str = "MIA_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "MIA_TIMEOUT_SECS";
pub const ENV_SESSION_DIR: &str = "MIA_SESSION_DIR";

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Normalized, without a trailing `/`.
    pub base_url: String,
    pub timeout: Duration,
    /// Directory holding the persisted session entries.
    pub session_dir: PathBuf,
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub session_dir: Option<PathBuf>,
    pub config_file: Option<PathBuf>,
}

/// Shape of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub session_dir: Option<PathBuf>,
}

impl ClientConfig {
    /// Configuration for `base_url` with default timeout and session dir.
    pub fn new(base_url: &str) -> MiaResult<Self> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            session_dir: default_session_dir(),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_session_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.session_dir = dir.into();
        self
    }

    /// Resolve from overrides, the process environment and the config file.
    pub fn resolve(overrides: ConfigOverrides) -> MiaResult<Self> {
        let path = overrides.config_file.clone().or_else(default_config_path);
        let file = match path {
            Some(path) if path.exists() => Some(load_file(&path)?),
            Some(path) if overrides.config_file.is_some() => {
                return Err(MiaError::config(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
            _ => None,
        };
        Self::resolve_with(overrides, |key| std::env::var(key).ok(), file)
    }

    /// Resolution with an injectable environment, used by `resolve`.
    pub fn resolve_with(
        overrides: ConfigOverrides,
        env: impl Fn(&str) -> Option<String>,
        file: Option<FileConfig>,
    ) -> MiaResult<Self> {
        let file = file.unwrap_or_default();
        let env = |key: &str| env(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let base_url = overrides
            .api_url
            .or_else(|| env(ENV_API_URL))
            .or(file.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let timeout_secs = match overrides.timeout_secs {
            Some(secs) => secs,
            None => match env(ENV_TIMEOUT_SECS) {
                Some(raw) => raw.parse().map_err(|_| {
                    MiaError::config(format!("{} must be a number of seconds, got '{}'", ENV_TIMEOUT_SECS, raw))
                })?,
                None => file.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            },
        };
        if timeout_secs == 0 {
            return Err(MiaError::config("timeout must be at least one second"));
        }

        let session_dir = overrides
            .session_dir
            .or_else(|| env(ENV_SESSION_DIR).map(PathBuf::from))
            .or(file.session_dir)
            .unwrap_or_else(default_session_dir);

        let config = Self {
            base_url: normalize_base_url(&base_url)?,
            timeout: Duration::from_secs(timeout_secs),
            session_dir,
        };
        debug!(base_url = %config.base_url, timeout_secs, "Resolved client configuration");
        Ok(config)
    }
}

/// Read and parse a TOML config file.
pub fn load_file(path: &Path) -> MiaResult<FileConfig> {
    let raw = std::fs::read_to_string(path)?;
    toml::from_str(&raw)
        .map_err(|e| MiaError::config(format!("invalid config file {}: {}", path.display(), e)))
}

/// `<config dir>/mia/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("mia").join("config.toml"))
}

/// `<local data dir>/mia/session`, or `.mia/session` when the platform has
/// no data directory.
pub fn default_session_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("mia").join("session"))
        .unwrap_or_else(|| PathBuf::from(".mia").join("session"))
}

/// Trim, drop trailing slashes and require an http(s) scheme with a host.
pub fn normalize_base_url(raw: &str) -> MiaResult<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(MiaError::config("base url must not be empty"));
    }
    let Some((scheme, remainder)) = trimmed.split_once("://") else {
        return Err(MiaError::config(format!("base url '{}' must use http:// or https://", trimmed)));
    };
    if scheme != "http" && scheme != "https" {
        return Err(MiaError::config(format!("base url '{}' must use http:// or https://", trimmed)));
    }
    if remainder.trim().is_empty() || remainder.starts_with('/') {
        return Err(MiaError::config(format!("base url '{}' has no host", trimmed)));
    }
    Ok(trimmed.to_string())
}
