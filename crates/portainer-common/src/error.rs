use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while assembling a [`ClientConfig`](crate::ClientConfig)
/// from a file or the process environment.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A required setting was not provided.
    #[error("Missing required setting: {0}")]
    MissingField(&'static str),

    /// The environment variable named as the API key source is unset.
    #[error("Environment variable '{0}' is not set")]
    MissingEnvVar(String),

    /// A setting was present but could not be interpreted.
    #[error("Invalid value for {field}: '{value}'")]
    InvalidValue {
        /// Name of the offending setting.
        field: &'static str,
        /// The raw value that was rejected.
        value: String,
    },

    /// The configuration file could not be read.
    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for this schema.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}
