//! Connection settings for a Portainer server.
//!
//! A [`ClientConfig`] is assembled once, either in code through the `with_*`
//! builder methods, from a TOML file, or from `PORTAINER_*` environment
//! variables, and is then frozen inside the client.
//!
//! ## Example Configuration
//!
//! ```toml
//! host = "portainer.example.com:9443"
//! base_path = "/api"
//! scheme = "https"
//! api_key_env = "PORTAINER_API_KEY"
//! skip_tls_verify = false
//! timeout_seconds = 30
//! ```

use std::fs;
use std::path::Path;

use log::debug;
use secrecy::SecretString;
use serde::Deserialize;

use crate::error::ConfigError;

/// Base path of the Portainer API when none is configured.
pub const DEFAULT_BASE_PATH: &str = "/api";

/// URL scheme used when none is configured.
pub const DEFAULT_SCHEME: &str = "https";

const ENV_HOST: &str = "PORTAINER_HOST";
const ENV_API_KEY: &str = "PORTAINER_API_KEY";
const ENV_BASE_PATH: &str = "PORTAINER_BASE_PATH";
const ENV_SCHEME: &str = "PORTAINER_SCHEME";
const ENV_SKIP_TLS_VERIFY: &str = "PORTAINER_SKIP_TLS_VERIFY";
const ENV_TIMEOUT_SECONDS: &str = "PORTAINER_TIMEOUT_SECONDS";

/// Configuration for a Portainer client.
///
/// Holds the server location, the API key and the transport settings shared by
/// the typed API handle and the proxy handle.
///
/// # Security
///
/// The `api_key` field uses `SecretString` so that it never shows up in `Debug`
/// output or logs.
///
/// # Examples
///
/// ```
/// use portainer_common::ClientConfig;
///
/// let config = ClientConfig::new("localhost:9443", "ptr_abc123")
///     .with_scheme("http")
///     .with_scheme("https");
///
/// // The last setting for a field wins
/// assert_eq!(config.scheme, "https");
/// assert_eq!(config.base_path, "/api");
/// assert!(!config.skip_tls_verify);
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Host of the Portainer server, including the port if any.
    pub host: String,
    /// Base path of the API (e.g. `/api` or `/portainer/api`).
    pub base_path: String,
    /// URL scheme, `http` or `https`.
    pub scheme: String,
    /// API key sent in the `x-api-key` header.
    pub api_key: SecretString,
    /// Accept invalid server certificates when `true`.
    pub skip_tls_verify: bool,
    /// Total request timeout in seconds. `None` leaves the transport default.
    pub timeout_seconds: Option<u64>,
}

impl ClientConfig {
    /// Creates a configuration for `host` authenticated with `api_key`.
    ///
    /// Every other setting starts at its default: base path `/api`, scheme
    /// `https`, TLS verification enabled and no timeout.
    pub fn new(host: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            base_path: DEFAULT_BASE_PATH.to_string(),
            scheme: DEFAULT_SCHEME.to_string(),
            api_key: SecretString::new(api_key.into().into()),
            skip_tls_verify: false,
            timeout_seconds: None,
        }
    }

    /// Sets the API base path.
    ///
    /// # Arguments
    ///
    /// * `base_path` - Path prefix of the API, with a leading slash
    #[must_use]
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    /// Sets the URL scheme.
    ///
    /// # Arguments
    ///
    /// * `scheme` - `http` or `https`
    #[must_use]
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Enables or disables server certificate verification.
    #[must_use]
    pub const fn with_skip_tls_verify(mut self, skip: bool) -> Self {
        self.skip_tls_verify = skip;
        self
    }

    /// Sets a total request timeout.
    ///
    /// # Arguments
    ///
    /// * `timeout_seconds` - Timeout in seconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = Some(timeout_seconds);
        self
    }

    /// Returns `{scheme}://{host}{base_path}`.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("{}://{}{}", self.scheme, self.host, self.base_path)
    }

    /// Parses a configuration from TOML.
    ///
    /// The API key is taken from `api_key` if present, otherwise from the
    /// environment variable named by `api_key_env`.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed, if no API key source is
    /// given, or if the named environment variable is unset.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Self::from_toml_with(contents, |name| std::env::var(name).ok())
    }

    /// Loads a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or fails to parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!("Loading Portainer client config from {}", path.display());

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&contents)
    }

    /// Builds a configuration from `PORTAINER_*` environment variables.
    ///
    /// `PORTAINER_HOST` and `PORTAINER_API_KEY` are required.
    /// `PORTAINER_BASE_PATH`, `PORTAINER_SCHEME`, `PORTAINER_SKIP_TLS_VERIFY`
    /// and `PORTAINER_TIMEOUT_SECONDS` are optional.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or an optional one
    /// cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup(ENV_HOST).ok_or(ConfigError::MissingField(ENV_HOST))?;
        let api_key = lookup(ENV_API_KEY).ok_or(ConfigError::MissingField(ENV_API_KEY))?;

        let mut config = Self::new(host, api_key);

        if let Some(base_path) = lookup(ENV_BASE_PATH) {
            config = config.with_base_path(base_path);
        }

        if let Some(scheme) = lookup(ENV_SCHEME) {
            config = config.with_scheme(scheme);
        }

        if let Some(raw) = lookup(ENV_SKIP_TLS_VERIFY) {
            config = config.with_skip_tls_verify(parse_bool(ENV_SKIP_TLS_VERIFY, &raw)?);
        }

        if let Some(raw) = lookup(ENV_TIMEOUT_SECONDS) {
            let timeout = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: ENV_TIMEOUT_SECONDS,
                value: raw.clone(),
            })?;
            config = config.with_timeout(timeout);
        }

        Ok(config)
    }

    fn from_toml_with(
        contents: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(contents)?;

        let api_key = match (file.api_key, file.api_key_env) {
            (Some(key), _) => key,
            (None, Some(var)) => {
                let value = lookup(&var).ok_or(ConfigError::MissingEnvVar(var))?;
                SecretString::new(value.into())
            }
            (None, None) => return Err(ConfigError::MissingField("api_key or api_key_env")),
        };

        let mut config = Self {
            host: file.host,
            base_path: DEFAULT_BASE_PATH.to_string(),
            scheme: DEFAULT_SCHEME.to_string(),
            api_key,
            skip_tls_verify: file.skip_tls_verify,
            timeout_seconds: file.timeout_seconds,
        };

        if let Some(base_path) = file.base_path {
            config.base_path = base_path;
        }

        if let Some(scheme) = file.scheme {
            config.scheme = scheme;
        }

        Ok(config)
    }
}

/// On-disk layout of the configuration file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    host: String,
    base_path: Option<String>,
    scheme: Option<String>,
    api_key: Option<SecretString>,
    api_key_env: Option<String>,
    #[serde(default)]
    skip_tls_verify: bool,
    timeout_seconds: Option<u64>,
}

fn parse_bool(field: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            field,
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]

    use std::collections::HashMap;
    use std::io::Write;

    use secrecy::ExposeSecret;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new("h", "key");

        assert_eq!(config.host, "h");
        assert_eq!(config.base_path, "/api");
        assert_eq!(config.scheme, "https");
        assert_eq!(config.api_key.expose_secret(), "key");
        assert!(!config.skip_tls_verify);
        assert!(config.timeout_seconds.is_none());
    }

    #[test]
    fn test_last_option_wins() {
        let config = ClientConfig::new("h", "key")
            .with_scheme("http")
            .with_base_path("/first")
            .with_skip_tls_verify(true)
            .with_scheme("https")
            .with_base_path("/portainer/api")
            .with_skip_tls_verify(false);

        assert_eq!(config.scheme, "https");
        assert_eq!(config.base_path, "/portainer/api");
        assert!(!config.skip_tls_verify);
    }

    #[test]
    fn test_base_url() {
        let config = ClientConfig::new("portainer.local:9000", "key").with_scheme("http");
        assert_eq!(config.base_url(), "http://portainer.local:9000/api");
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = ClientConfig::new("h", "super-secret-key");
        let debug_str = format!("{config:?}");

        assert!(!debug_str.contains("super-secret-key"));
        assert!(debug_str.contains("REDACTED"));
    }

    #[test]
    fn test_parse_toml_with_inline_key() {
        let toml = r#"
host = "portainer.example.com:9443"
api_key = "ptr_inline"
base_path = "/portainer/api"
skip_tls_verify = true
timeout_seconds = 15
        "#;

        let config = ClientConfig::from_toml_with(toml, vars(&[])).unwrap();

        assert_eq!(config.host, "portainer.example.com:9443");
        assert_eq!(config.api_key.expose_secret(), "ptr_inline");
        assert_eq!(config.base_path, "/portainer/api");
        assert_eq!(config.scheme, "https");
        assert!(config.skip_tls_verify);
        assert_eq!(config.timeout_seconds, Some(15));
    }

    #[test]
    fn test_parse_toml_with_key_from_env() {
        let toml = r#"
host = "localhost:9000"
scheme = "http"
api_key_env = "MY_PORTAINER_KEY"
        "#;

        let config =
            ClientConfig::from_toml_with(toml, vars(&[("MY_PORTAINER_KEY", "ptr_env")])).unwrap();

        assert_eq!(config.api_key.expose_secret(), "ptr_env");
        assert_eq!(config.scheme, "http");
        assert_eq!(config.base_path, "/api");
        assert!(!config.skip_tls_verify);
    }

    #[test]
    fn test_inline_key_takes_precedence_over_env() {
        let toml = r#"
host = "h"
api_key = "inline"
api_key_env = "MY_PORTAINER_KEY"
        "#;

        let config =
            ClientConfig::from_toml_with(toml, vars(&[("MY_PORTAINER_KEY", "from-env")])).unwrap();
        assert_eq!(config.api_key.expose_secret(), "inline");
    }

    #[test]
    fn test_parse_toml_missing_env_var() {
        let toml = r#"
host = "h"
api_key_env = "UNSET_VARIABLE"
        "#;

        let err = ClientConfig::from_toml_with(toml, vars(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref v) if v == "UNSET_VARIABLE"));
    }

    #[test]
    fn test_parse_toml_missing_key_source() {
        let err = ClientConfig::from_toml_with(r#"host = "h""#, vars(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(_)));
    }

    #[test]
    fn test_parse_toml_rejects_unknown_fields() {
        let toml = r#"
host = "h"
api_key = "k"
verify = false
        "#;

        let err = ClientConfig::from_toml_with(toml, vars(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "host = \"file-host:9443\"").unwrap();
        writeln!(file, "api_key = \"ptr_file\"").unwrap();

        let config = ClientConfig::load(file.path()).unwrap();
        assert_eq!(config.host, "file-host:9443");
        assert_eq!(config.api_key.expose_secret(), "ptr_file");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ClientConfig::load(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_from_env_vars() {
        let config = ClientConfig::from_vars(vars(&[
            ("PORTAINER_HOST", "env-host:9000"),
            ("PORTAINER_API_KEY", "ptr_env"),
            ("PORTAINER_SCHEME", "http"),
            ("PORTAINER_BASE_PATH", "/portainer/api"),
            ("PORTAINER_SKIP_TLS_VERIFY", "TRUE"),
            ("PORTAINER_TIMEOUT_SECONDS", "45"),
        ]))
        .unwrap();

        assert_eq!(config.host, "env-host:9000");
        assert_eq!(config.api_key.expose_secret(), "ptr_env");
        assert_eq!(config.scheme, "http");
        assert_eq!(config.base_path, "/portainer/api");
        assert!(config.skip_tls_verify);
        assert_eq!(config.timeout_seconds, Some(45));
    }

    #[test]
    fn test_from_env_vars_defaults() {
        let config = ClientConfig::from_vars(vars(&[
            ("PORTAINER_HOST", "h"),
            ("PORTAINER_API_KEY", "k"),
        ]))
        .unwrap();

        assert_eq!(config.scheme, "https");
        assert_eq!(config.base_path, "/api");
        assert!(!config.skip_tls_verify);
    }

    #[test]
    fn test_from_env_vars_missing_host() {
        let err = ClientConfig::from_vars(vars(&[("PORTAINER_API_KEY", "k")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("PORTAINER_HOST")));
    }

    #[test]
    fn test_from_env_vars_invalid_bool() {
        let err = ClientConfig::from_vars(vars(&[
            ("PORTAINER_HOST", "h"),
            ("PORTAINER_API_KEY", "k"),
            ("PORTAINER_SKIP_TLS_VERIFY", "maybe"),
        ]))
        .unwrap_err();

        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "PORTAINER_SKIP_TLS_VERIFY",
                ..
            }
        ));
    }
}

#[cfg(test)]
mod proptests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]

    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn last_scheme_wins(schemes in prop::collection::vec("(http|https)", 1..8)) {
            let config = schemes
                .iter()
                .fold(ClientConfig::new("h", "k"), |config, scheme| {
                    config.with_scheme(scheme.as_str())
                });

            prop_assert_eq!(&config.scheme, schemes.last().unwrap());
        }

        #[test]
        fn last_base_path_wins(paths in prop::collection::vec("/[a-z]{1,10}", 1..8)) {
            let config = paths
                .iter()
                .fold(ClientConfig::new("h", "k"), |config, path| {
                    config.with_base_path(path.as_str())
                });

            prop_assert_eq!(&config.base_path, paths.last().unwrap());
        }

        #[test]
        fn last_skip_tls_verify_wins(flags in prop::collection::vec(any::<bool>(), 1..8)) {
            let config = flags
                .iter()
                .fold(ClientConfig::new("h", "k"), |config, flag| {
                    config.with_skip_tls_verify(*flag)
                });

            prop_assert_eq!(config.skip_tls_verify, *flags.last().unwrap());
        }

        #[test]
        fn construction_keeps_host_and_key(
            host in "[a-z0-9.-]{1,30}(:[0-9]{1,5})?",
            key in "[A-Za-z0-9_]{1,40}",
        ) {
            use secrecy::ExposeSecret;

            let config = ClientConfig::new(host.clone(), key.clone());
            prop_assert_eq!(config.host, host);
            prop_assert_eq!(config.api_key.expose_secret(), key.as_str());
        }
    }
}
