//! # Configuration
//!
//! `mercury.toml`, every field optional:
//!
//! ```toml
//! [backend]
//! url = "http://localhost:8080"
//! origin = "https://fairspace.example"  # defaults to url
//! timeout_secs = 30
//! api_key = "..."
//! ```
//!
//! `MERCURY_URL` and `MERCURY_API_KEY` override the file; command-line flags
//! override both.

use crate::ClientError;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Environment variable overriding `backend.url`.
pub const URL_ENV: &str = "MERCURY_URL";
/// Environment variable overriding `backend.api_key`.
pub const API_KEY_ENV: &str = "MERCURY_API_KEY";

#[derive(Clone, Default, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the backend API.
    pub url: String,
    /// Origin new subject IRIs are minted under. Defaults to `url`.
    pub origin: Option<String>,
    pub timeout_secs: u64,
    /// Bearer token sent with every request.
    pub api_key: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080".to_string(),
            origin: None,
            timeout_secs: 30,
            api_key: None,
        }
    }
}

impl Config {
    /// Parse a configuration document.
    pub fn from_toml_str(source: &str) -> Result<Self, ClientError> {
        toml::from_str(source).map_err(|e| ClientError::Config(e.to_string()))
    }

    /// Load `path`, or the defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, ClientError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let source = std::fs::read_to_string(path)
            .map_err(|e| ClientError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    /// Apply `MERCURY_URL` and `MERCURY_API_KEY` from the process environment.
    #[must_use]
    pub fn with_env(self) -> Self {
        self.with_env_from(|name| std::env::var(name).ok())
    }

    /// Apply environment overrides read through `lookup`.
    #[must_use]
    pub fn with_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(URL_ENV).filter(|v| !v.is_empty()) {
            self.backend.url = url;
        }
        if let Some(key) = lookup(API_KEY_ENV).filter(|v| !v.is_empty()) {
            self.backend.api_key = Some(key);
        }
        self
    }

    /// Apply a `--url` flag.
    #[must_use]
    pub fn with_url(mut self, url: Option<String>) -> Self {
        if let Some(url) = url {
            self.backend.url = url;
        }
        self
    }

    /// Origin for minted subjects.
    pub fn origin(&self) -> &str {
        self.backend
            .origin
            .as_deref()
            .unwrap_or(&self.backend.url)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.backend.timeout_secs)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::io::Write;

    #[test]
    fn empty_document_gives_defaults() {
        let config = Config::from_toml_str("").expect("parse");
        assert_eq!(config, Config::default());
        assert_eq!(config.origin(), "http://localhost:8080");
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn partial_backend_section_keeps_other_defaults() {
        let config = Config::from_toml_str(
            "[backend]\nurl = \"https://fairspace.example/\"\norigin = \"https://data.example\"\n",
        )
        .expect("parse");
        assert_eq!(config.backend.url, "https://fairspace.example/");
        assert_eq!(config.origin(), "https://data.example");
        assert_eq!(config.backend.timeout_secs, 30);
        assert!(config.backend.api_key.is_none());
    }

    #[test]
    fn malformed_document_is_a_config_error() {
        let err = Config::from_toml_str("[backend\nurl = 1").expect_err("must fail");
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "[backend]\ntimeout_secs = 5\napi_key = \"secret\"").expect("write");

        let config = Config::load(Some(file.path())).expect("load");
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.backend.api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = Config::load(Some(dir.path().join("absent.toml").as_path()))
            .expect_err("must fail");
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn env_overrides_file_and_flag_overrides_env() {
        let env: BTreeMap<&str, &str> = [
            (URL_ENV, "http://from-env:8080"),
            (API_KEY_ENV, "env-key"),
        ]
        .into_iter()
        .collect();
        let lookup = |name: &str| env.get(name).map(|v| v.to_string());

        let file = "[backend]\nurl = \"http://from-file\"\napi_key = \"file-key\"";
        let config = Config::from_toml_str(file)
            .expect("parse")
            .with_env_from(lookup);
        assert_eq!(config.backend.url, "http://from-env:8080");
        assert_eq!(config.backend.api_key.as_deref(), Some("env-key"));

        let config = config.with_url(Some("http://from-flag".to_string()));
        assert_eq!(config.backend.url, "http://from-flag");
        assert_eq!(config.with_url(None).backend.url, "http://from-flag");
    }
}
