//! API key authentication.
//!
//! Every request sent to Portainer, whether through the typed API handle or the
//! proxy handle, carries the key in the `x-api-key` header.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

use crate::error::ClientError;

/// Header Portainer reads the API key from.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Injects the configured API key into outgoing requests.
///
/// Cheap to clone; the key itself is shared and never copied out of its
/// `SecretString` except to build the header value.
#[derive(Clone)]
pub struct ApiKeyAuth {
    api_key: Arc<SecretString>,
}

impl ApiKeyAuth {
    /// Creates an authenticator for `api_key`.
    #[must_use]
    pub fn new(api_key: SecretString) -> Self {
        Self {
            api_key: Arc::new(api_key),
        }
    }

    /// Sets `x-api-key` on `headers`, replacing any existing value.
    ///
    /// The header value is marked sensitive so HTTP-level debug output hides it.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::RequestConstruction`] if the key contains bytes
    /// that are not allowed in an HTTP header value.
    pub fn apply(&self, headers: &mut HeaderMap) -> Result<(), ClientError> {
        let mut value = HeaderValue::from_str(self.api_key.expose_secret()).map_err(|_| {
            ClientError::RequestConstruction("API key is not a valid header value".to_string())
        })?;
        value.set_sensitive(true);

        headers.insert(HeaderName::from_static(API_KEY_HEADER), value);
        Ok(())
    }
}

impl std::fmt::Debug for ApiKeyAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyAuth")
            .field("header", &API_KEY_HEADER)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}
