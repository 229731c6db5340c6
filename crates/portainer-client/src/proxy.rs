//! Forwarding of arbitrary requests to an environment's Docker or Kubernetes API.
//!
//! Portainer exposes the native API of every managed environment under
//! `{base_path}/endpoints/{id}/docker` and `{base_path}/endpoints/{id}/kubernetes`.
//! [`ProxyClient`] builds requests against those mount points, authenticates
//! them with the API key and hands the raw response back unread.
//!
//! ```text
//! caller → ProxyClient → Portainer /endpoints/{id}/{docker|kubernetes} → environment
//!              ↑
//!         x-api-key
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use log::debug;
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::{Body, Client, Method, Request, Response};
use typed_builder::TypedBuilder;
use url::Url;

use portainer_common::{ClientConfig, EnvironmentId, SubApi};

use crate::auth::ApiKeyAuth;
use crate::error::ClientError;
use crate::transport;

/// Description of a request to forward through Portainer.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
///
/// use portainer_client::ProxyRequest;
///
/// let request = ProxyRequest::builder()
///     .method("GET")
///     .api_path("/containers/json")
///     .query_params(HashMap::from([("all".to_string(), "true".to_string())]))
///     .build();
///
/// assert_eq!(request.api_path, "/containers/json");
/// assert!(request.body.is_none());
/// ```
#[derive(Debug, TypedBuilder)]
pub struct ProxyRequest {
    /// HTTP method token (`GET`, `POST`, ...).
    #[builder(setter(into))]
    pub method: String,
    /// Path on the sub-API, including the leading slash
    /// (e.g. `/containers/json` or `/api/v1/namespaces/default/pods`).
    ///
    /// Sent as written. `.` and `..` segments are rejected rather than
    /// resolved.
    #[builder(setter(into))]
    pub api_path: String,
    /// Query parameters to set on the URL.
    #[builder(default, setter(strip_option))]
    pub query_params: Option<HashMap<String, String>>,
    /// Headers to set on the request after authentication.
    #[builder(default, setter(strip_option))]
    pub headers: Option<HashMap<String, String>>,
    /// Request body, forwarded as-is.
    ///
    /// Use [`Body::wrap_stream`] to forward large payloads without buffering them.
    #[builder(default, setter(strip_option, into))]
    pub body: Option<Body>,
}

/// HTTP client that routes requests through Portainer's environment proxy.
///
/// The client is cheaply cloneable and can be shared across multiple tasks.
#[derive(Clone)]
pub struct ProxyClient {
    http: Client,
    config: Arc<ClientConfig>,
    auth: ApiKeyAuth,
}

impl ProxyClient {
    /// Creates a proxy handle over `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client fails to build.
    pub(crate) fn new(config: Arc<ClientConfig>, auth: ApiKeyAuth) -> Result<Self, ClientError> {
        Ok(Self {
            http: transport::http_client(&config)?,
            config,
            auth,
        })
    }

    /// Forwards `request` to `sub_api` of environment `environment_id`.
    ///
    /// The response is returned as received: status codes are not inspected
    /// and the body is left unread for the caller to consume.
    ///
    /// # Header precedence
    ///
    /// `x-api-key` is set first and caller headers are applied afterwards, so a
    /// caller header with the same name replaces the configured key.
    ///
    /// # Errors
    ///
    /// - [`ClientError::RequestConstruction`] if the method, path, URL or a
    ///   header is invalid, including a path with `.` or `..` segments
    /// - [`ClientError::RequestExecution`] if the request could not be sent
    pub async fn forward(
        &self,
        sub_api: SubApi,
        environment_id: EnvironmentId,
        request: ProxyRequest,
    ) -> Result<Response, ClientError> {
        let request = self.build_request(sub_api, environment_id, request)?;

        debug!(
            "Proxying {} {} to environment {environment_id} ({sub_api})",
            request.method(),
            request.url().path()
        );

        self.http
            .execute(request)
            .await
            .map_err(|e| ClientError::execution("send proxy request", e))
    }

    /// Returns the URL a request for `api_path` is sent to, before query
    /// parameters are applied.
    #[must_use]
    pub fn target_url(
        &self,
        sub_api: SubApi,
        environment_id: EnvironmentId,
        api_path: &str,
    ) -> String {
        format!(
            "{}/endpoints/{environment_id}/{}{api_path}",
            self.config.base_url(),
            sub_api.mount_point()
        )
    }

    /// Builds the outgoing request.
    ///
    /// This method:
    /// 1. Assembles the target URL from the configuration and `api_path`,
    ///    rejecting paths that would resolve outside the environment's mount
    ///    point
    /// 2. Sets the query parameters, if any
    /// 3. Adds the `x-api-key` header
    /// 4. Applies caller headers, overwriting headers of the same name
    /// 5. Attaches the body without reading it
    pub(crate) fn build_request(
        &self,
        sub_api: SubApi,
        environment_id: EnvironmentId,
        request: ProxyRequest,
    ) -> Result<Request, ClientError> {
        let ProxyRequest {
            method,
            api_path,
            query_params,
            headers,
            body,
        } = request;

        transport::check_path(&api_path)?;

        let method = Method::from_bytes(method.as_bytes()).map_err(|_| {
            ClientError::RequestConstruction(format!("invalid HTTP method '{method}'"))
        })?;

        let target = self.target_url(sub_api, environment_id, &api_path);
        let mut url = Url::parse(&target).map_err(|e| {
            ClientError::RequestConstruction(format!("invalid proxy URL '{target}': {e}"))
        })?;
        self.check_within_mount(sub_api, environment_id, &url)?;

        if let Some(params) = query_params {
            set_query_params(&mut url, params);
        }

        let mut outgoing = Request::new(method, url);
        self.auth.apply(outgoing.headers_mut())?;

        for (name, value) in headers.into_iter().flatten() {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
                ClientError::RequestConstruction(format!("invalid header name '{name}'"))
            })?;
            let header_value = HeaderValue::from_str(&value).map_err(|_| {
                ClientError::RequestConstruction(format!("invalid value for header '{name}'"))
            })?;
            outgoing.headers_mut().insert(header_name, header_value);
        }

        *outgoing.body_mut() = body;

        Ok(outgoing)
    }

    /// Fails unless `url` still points at the environment's mount point once
    /// parsed.
    fn check_within_mount(
        &self,
        sub_api: SubApi,
        environment_id: EnvironmentId,
        url: &Url,
    ) -> Result<(), ClientError> {
        let mount = self.target_url(sub_api, environment_id, "");
        let mount = Url::parse(&mount).map_err(|e| {
            ClientError::RequestConstruction(format!("invalid proxy URL '{mount}': {e}"))
        })?;

        let path = url.path();
        let inside = path
            .strip_prefix(mount.path())
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'));

        if !inside {
            return Err(ClientError::RequestConstruction(format!(
                "path '{path}' resolves outside {}",
                mount.path()
            )));
        }

        Ok(())
    }
}

/// Sets each parameter on `url`, replacing any value already present in the
/// path's query string.
///
/// The query is re-encoded sorted by key, form-urlencoded.
fn set_query_params(url: &mut Url, params: HashMap<String, String>) {
    let mut query: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (key, value) in url.query_pairs() {
        query
            .entry(key.into_owned())
            .or_default()
            .push(value.into_owned());
    }

    for (key, value) in params {
        query.insert(key, vec![value]);
    }

    url.set_query(None);
    if query.is_empty() {
        return;
    }

    let mut pairs = url.query_pairs_mut();
    for (key, values) in &query {
        for value in values {
            pairs.append_pair(key, value);
        }
    }
}

impl std::fmt::Debug for ProxyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyClient")
            .field("base_url", &self.config.base_url())
            .field("auth", &self.auth)
            .field("skip_tls_verify", &self.config.skip_tls_verify)
            .finish_non_exhaustive()
    }
}
