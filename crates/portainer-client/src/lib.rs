//! # portainer-client
//!
//! Client library for the Portainer container-management API.
//!
//! A [`PortainerClient`] authenticates every request with an API key sent in
//! the `x-api-key` header and offers two ways to talk to the server:
//! - [`ManagementApi`]: typed calls to Portainer's own endpoints
//! - [`ProxyClient`]: forwarding of arbitrary requests to the Docker or
//!   Kubernetes API of a managed environment, with Portainer acting as a
//!   reverse proxy
//!
//! Proxied responses are returned unread and uninterpreted; a 404 from Docker
//! is an `Ok` response, not an error.
//!
//! ## Example
//!
//! ```no_run
//! use std::collections::HashMap;
//!
//! use portainer_client::{PortainerClient, ProxyRequest};
//! use portainer_common::ClientConfig;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ClientConfig::new("portainer.example.com:9443", "ptr_abc123")
//!     .with_skip_tls_verify(true);
//! let client = PortainerClient::new(config)?;
//!
//! // Typed management call
//! for environment in client.api().list_environments().await? {
//!     println!("{} {}", environment.id, environment.name);
//! }
//!
//! // GET https://portainer.example.com:9443/api/endpoints/3/kubernetes/api/v1/namespaces/default/pods?limit=10
//! let response = client
//!     .proxy_kubernetes_request(
//!         3,
//!         ProxyRequest::builder()
//!             .method("GET")
//!             .api_path("/api/v1/namespaces/default/pods")
//!             .query_params(HashMap::from([("limit".to_string(), "10".to_string())]))
//!             .build(),
//!     )
//!     .await?;
//!
//! println!("{}: {}", response.status(), response.text().await?);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod client;
pub mod error;
pub mod proxy;
mod transport;

pub use api::ManagementApi;
pub use auth::{API_KEY_HEADER, ApiKeyAuth};
pub use client::PortainerClient;
pub use error::ClientError;
pub use proxy::{ProxyClient, ProxyRequest};

pub use reqwest::{Body, Response};
