//! The Portainer client and its construction.

use std::sync::Arc;

use log::{debug, warn};
use reqwest::Response;

use portainer_common::{ClientConfig, EnvironmentId, SubApi};

use crate::api::ManagementApi;
use crate::auth::ApiKeyAuth;
use crate::error::ClientError;
use crate::proxy::{ProxyClient, ProxyRequest};

/// Client for a Portainer server authenticated with an API key.
///
/// Owns two handles built from the same frozen [`ClientConfig`]:
/// - [`ManagementApi`] for Portainer's own endpoints
/// - [`ProxyClient`] for forwarding requests to an environment's Docker or
///   Kubernetes API
///
/// Both handles send `x-api-key` on every request. The client is cheaply
/// cloneable and safe to share across tasks; nothing in it is mutable.
///
/// # Examples
///
/// ```no_run
/// use portainer_client::{PortainerClient, ProxyRequest};
/// use portainer_common::ClientConfig;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = ClientConfig::new("portainer.example.com:9443", "ptr_abc123");
/// let client = PortainerClient::new(config)?;
///
/// let response = client
///     .proxy_docker_request(
///         1,
///         ProxyRequest::builder()
///             .method("GET")
///             .api_path("/containers/json")
///             .build(),
///     )
///     .await?;
///
/// println!("{}", response.text().await?);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PortainerClient {
    api: ManagementApi,
    proxy: ProxyClient,
    config: Arc<ClientConfig>,
}

impl PortainerClient {
    /// Creates a client from a configuration.
    ///
    /// No network I/O happens here. The host and base path are not validated;
    /// a malformed value surfaces as [`ClientError::RequestConstruction`] on
    /// the first request.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] only if the HTTP/TLS backend
    /// cannot be initialised.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        if config.skip_tls_verify {
            warn!(
                "TLS certificate verification is disabled for Portainer host {}",
                config.host
            );
        }

        let auth = ApiKeyAuth::new(config.api_key.clone());
        let config = Arc::new(config);

        let api = ManagementApi::new(Arc::clone(&config), auth.clone())?;
        let proxy = ProxyClient::new(Arc::clone(&config), auth)?;

        debug!("Portainer client configured for {}", config.base_url());

        Ok(Self { api, proxy, config })
    }

    /// Creates a client from `PORTAINER_*` environment variables.
    ///
    /// See [`ClientConfig::from_env`] for the variables read.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] if the environment is incomplete
    /// or invalid, or if the HTTP client fails to build.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Returns the configuration the client was built with.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the typed management API handle.
    #[must_use]
    pub const fn api(&self) -> &ManagementApi {
        &self.api
    }

    /// Returns the proxy handle.
    #[must_use]
    pub const fn proxy(&self) -> &ProxyClient {
        &self.proxy
    }

    /// Forwards a request to the Docker API of environment `environment_id`.
    ///
    /// The request goes to
    /// `{scheme}://{host}{base_path}/endpoints/{environment_id}/docker{api_path}`.
    /// Error statuses from Docker are returned as ordinary responses.
    ///
    /// # Errors
    ///
    /// See [`ProxyClient::forward`].
    pub async fn proxy_docker_request(
        &self,
        environment_id: EnvironmentId,
        request: ProxyRequest,
    ) -> Result<Response, ClientError> {
        self.proxy
            .forward(SubApi::Docker, environment_id, request)
            .await
    }

    /// Forwards a request to the Kubernetes API of environment `environment_id`.
    ///
    /// The request goes to
    /// `{scheme}://{host}{base_path}/endpoints/{environment_id}/kubernetes{api_path}`.
    /// Error statuses from Kubernetes are returned as ordinary responses.
    ///
    /// # Errors
    ///
    /// See [`ProxyClient::forward`].
    pub async fn proxy_kubernetes_request(
        &self,
        environment_id: EnvironmentId,
        request: ProxyRequest,
    ) -> Result<Response, ClientError> {
        self.proxy
            .forward(SubApi::Kubernetes, environment_id, request)
            .await
    }
}

impl std::fmt::Debug for PortainerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortainerClient")
            .field("config", &self.config)
            .field("api", &self.api)
            .field("proxy", &self.proxy)
            .finish()
    }
}
