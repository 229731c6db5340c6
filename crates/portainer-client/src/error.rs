//! Error types for the client library.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use portainer_common::ConfigError;

/// Error body returned by the Portainer management API.
///
/// Portainer reports failures as `{"message": "...", "details": "..."}`.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    /// Short description of the failure.
    pub message: String,
    /// Additional detail, usually the underlying Go error text.
    #[serde(default)]
    pub details: Option<String>,
}

/// Errors that can occur when talking to a Portainer server.
///
/// Proxied calls only ever produce [`ClientError::RequestConstruction`] or
/// [`ClientError::RequestExecution`]; HTTP error statuses from a proxied sub-API
/// are returned to the caller as ordinary responses.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// The request could not be built.
    ///
    /// Raised by both handles for an invalid method token, path, URL, header
    /// name or header value.
    /// This is a caller error; retrying the same input fails the same way.
    #[error("failed to create request: {0}")]
    RequestConstruction(String),

    /// The request was built but sending it failed.
    ///
    /// Covers DNS resolution, refused connections, TLS handshake failures and
    /// timeouts when one is configured.
    #[error("failed to {context}: {source}")]
    RequestExecution {
        /// The step that failed, e.g. `send proxy request`.
        context: &'static str,
        /// Underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// Client configuration issue.
    ///
    /// The HTTP transport could not be initialised, or a configuration source
    /// was invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Non-success status from a typed management API call.
    #[error("Portainer API returned {status}: {message}")]
    Api {
        /// HTTP status returned by the server.
        status: StatusCode,
        /// Message extracted from the error body, or the raw body.
        message: String,
    },

    /// A typed management API response could not be decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// Check if the request never left the client because it was malformed.
    pub const fn is_construction_error(&self) -> bool {
        matches!(self, Self::RequestConstruction(_))
    }

    /// Check if this is a transport-level failure.
    pub const fn is_execution_error(&self) -> bool {
        matches!(self, Self::RequestExecution { .. })
    }

    /// HTTP status of an [`ClientError::Api`] error.
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) const fn execution(context: &'static str, source: reqwest::Error) -> Self {
        Self::RequestExecution { context, source }
    }

    /// Builds an [`ClientError::Api`] from a status and raw response body.
    pub(crate) fn api(status: StatusCode, body: &str) -> Self {
        let message = match serde_json::from_str::<ErrorResponse>(body) {
            Ok(ErrorResponse {
                message,
                details: Some(details),
            }) if !details.is_empty() => format!("{message} ({details})"),
            Ok(ErrorResponse { message, .. }) => message,
            Err(_) if body.trim().is_empty() => status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string(),
            Err(_) => body.trim().to_string(),
        };

        Self::Api { status, message }
    }
}

impl From<ConfigError> for ClientError {
    fn from(err: ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}
