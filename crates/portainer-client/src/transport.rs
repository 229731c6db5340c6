use std::time::Duration;

use reqwest::Client;

use portainer_common::ClientConfig;

use crate::error::ClientError;

/// Builds the HTTP transport for one of the client handles.
///
/// Certificate verification follows `skip_tls_verify`. No timeout is set unless
/// the configuration asks for one.
pub(crate) fn http_client(config: &ClientConfig) -> Result<Client, ClientError> {
    let mut builder = Client::builder();

    if config.skip_tls_verify {
        builder = builder.danger_accept_invalid_certs(true);
    }

    if let Some(timeout) = config.timeout_seconds {
        builder = builder.timeout(Duration::from_secs(timeout));
    }

    builder
        .build()
        .map_err(|e| ClientError::Configuration(format!("failed to build HTTP client: {e}")))
}

/// Checks a caller-supplied path before it is appended to a base URL.
///
/// The path must start with `/` unless it is empty, and must not contain `.`
/// or `..` segments, including their percent-encoded forms. URL parsing
/// resolves those segments, which would move the request outside the prefix
/// it was appended to. Backslashes are rejected because `http` and `https`
/// URLs treat them as separators.
pub(crate) fn check_path(path: &str) -> Result<(), ClientError> {
    if !path.is_empty() && !path.starts_with('/') {
        return Err(ClientError::RequestConstruction(format!(
            "path '{path}' must start with '/'"
        )));
    }

    let path_only = path.split(['?', '#']).next().unwrap_or_default();

    if path_only.contains('\\') {
        return Err(ClientError::RequestConstruction(format!(
            "path '{path}' must not contain '\\'"
        )));
    }

    if path_only.split('/').any(is_dot_segment) {
        return Err(ClientError::RequestConstruction(format!(
            "path '{path}' must not contain '.' or '..' segments"
        )));
    }

    Ok(())
}

fn is_dot_segment(segment: &str) -> bool {
    // Tabs and newlines are stripped by the URL parser before resolution
    let normalized: String = segment
        .chars()
        .filter(|c| !matches!(c, '\t' | '\n' | '\r'))
        .collect::<String>()
        .to_ascii_lowercase()
        .replace("%2e", ".");

    matches!(normalized.as_str(), "." | "..")
}
