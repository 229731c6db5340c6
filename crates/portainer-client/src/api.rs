//! Typed calls to Portainer's own management endpoints.

use std::sync::Arc;

use log::debug;
use reqwest::header::{ACCEPT, HeaderValue};
use reqwest::{Client, Method, Request};
use serde::de::DeserializeOwned;
use url::Url;

use portainer_common::{ClientConfig, Environment, EnvironmentId, SystemStatus};

use crate::auth::ApiKeyAuth;
use crate::error::ClientError;
use crate::transport;

/// Handle for the management API.
///
/// Unlike [`ProxyClient`](crate::ProxyClient), this handle checks status codes
/// and decodes JSON bodies: non-success statuses become [`ClientError::Api`].
#[derive(Clone)]
pub struct ManagementApi {
    http: Client,
    config: Arc<ClientConfig>,
    auth: ApiKeyAuth,
}

impl ManagementApi {
    pub(crate) fn new(config: Arc<ClientConfig>, auth: ApiKeyAuth) -> Result<Self, ClientError> {
        Ok(Self {
            http: transport::http_client(&config)?,
            config,
            auth,
        })
    }

    /// Fetches the server version and instance id (`GET /system/status`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the server answers with a
    /// non-success status, or the body cannot be decoded.
    pub async fn system_status(&self) -> Result<SystemStatus, ClientError> {
        self.get_json("/system/status").await
    }

    /// Lists the environments visible to the API key (`GET /endpoints`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the server answers with a
    /// non-success status, or the body cannot be decoded.
    pub async fn list_environments(&self) -> Result<Vec<Environment>, ClientError> {
        self.get_json("/endpoints").await
    }

    /// Fetches a single environment (`GET /endpoints/{id}`).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Api`] with status 404 if the environment does not
    /// exist, or any of the errors of [`ManagementApi::get_json`].
    pub async fn get_environment(&self, id: EnvironmentId) -> Result<Environment, ClientError> {
        self.get_json(&format!("/endpoints/{id}")).await
    }

    /// Performs an authenticated `GET {base_path}{path}` and decodes the JSON body.
    ///
    /// Use this for management endpoints that have no dedicated method.
    ///
    /// # Errors
    ///
    /// - [`ClientError::RequestConstruction`] if `path` lacks a leading `/`,
    ///   contains `.` or `..` segments, or the URL is invalid
    /// - [`ClientError::RequestExecution`] if the request or body read fails
    /// - [`ClientError::Api`] for a non-success status
    /// - [`ClientError::Serialization`] if the body is not the expected JSON
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let request = self.build_request(Method::GET, path)?;
        debug!("Portainer API request: {} {}", request.method(), request.url().path());

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| ClientError::execution("send management API request", e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::execution("read management API response", e))?;

        if !status.is_success() {
            debug!("Portainer API returned {status} for {path}");
            return Err(ClientError::api(status, &body));
        }

        Ok(serde_json::from_str(&body)?)
    }

    fn build_request(&self, method: Method, path: &str) -> Result<Request, ClientError> {
        transport::check_path(path)?;

        let target = format!("{}{path}", self.config.base_url());
        let url = Url::parse(&target).map_err(|e| {
            ClientError::RequestConstruction(format!("invalid API URL '{target}': {e}"))
        })?;

        let mut request = Request::new(method, url);
        request
            .headers_mut()
            .insert(ACCEPT, HeaderValue::from_static("application/json"));
        self.auth.apply(request.headers_mut())?;

        Ok(request)
    }
}

impl std::fmt::Debug for ManagementApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagementApi")
            .field("base_url", &self.config.base_url())
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]

    use super::*;
    use crate::auth::API_KEY_HEADER;
    use portainer_common::{EnvironmentType, SubApi};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn api_for(server: &MockServer) -> ManagementApi {
        let config =
            ClientConfig::new(server.address().to_string(), "test-key").with_scheme("http");
        let auth = ApiKeyAuth::new(config.api_key.clone());
        ManagementApi::new(Arc::new(config), auth).unwrap()
    }

    #[test]
    fn test_build_request_sets_auth_and_accept() {
        let config = ClientConfig::new("h", "test-key");
        let auth = ApiKeyAuth::new(config.api_key.clone());
        let api = ManagementApi::new(Arc::new(config), auth).unwrap();

        let request = api.build_request(Method::GET, "/endpoints/4").unwrap();

        assert_eq!(request.url().as_str(), "https://h/api/endpoints/4");
        assert_eq!(request.headers().get(API_KEY_HEADER).unwrap(), "test-key");
        assert_eq!(request.headers().get(ACCEPT).unwrap(), "application/json");
    }

    #[test]
    fn test_build_request_rejects_relative_path() {
        let config = ClientConfig::new("h", "test-key");
        let auth = ApiKeyAuth::new(config.api_key.clone());
        let api = ManagementApi::new(Arc::new(config), auth).unwrap();

        let err = api.build_request(Method::GET, "users/me").unwrap_err();
        assert!(err.is_construction_error());

        let err = api.build_request(Method::GET, "/endpoints/../users").unwrap_err();
        assert!(err.is_construction_error());
    }

    #[tokio::test]
    async fn test_relative_path_sends_nothing() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(0)
            .mount(&mock_server)
            .await;

        let err = api_for(&mock_server)
            .get_json::<serde_json::Value>("users/me")
            .await
            .unwrap_err();

        assert!(err.is_construction_error());
    }

    #[tokio::test]
    async fn test_system_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/system/status"))
            .and(header("x-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Version": "2.19.4",
                "InstanceID": "abc-123"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let status = api_for(&mock_server).system_status().await.unwrap();

        assert_eq!(status.version, "2.19.4");
        assert_eq!(status.instance_id, "abc-123");
    }

    #[tokio::test]
    async fn test_list_environments() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/endpoints"))
            .and(header("x-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"Id": 1, "Name": "local", "Type": 1, "URL": "unix:///var/run/docker.sock", "Status": 1},
                {"Id": 3, "Name": "cluster", "Type": 6, "URL": "10.0.0.3:9001", "Status": 2}
            ])))
            .mount(&mock_server)
            .await;

        let environments = api_for(&mock_server).list_environments().await.unwrap();

        assert_eq!(environments.len(), 2);
        assert_eq!(environments[0].name, "local");
        assert_eq!(environments[0].sub_api(), Some(SubApi::Docker));
        assert_eq!(environments[1].kind, EnvironmentType::AgentOnKubernetes);
        assert!(!environments[1].is_up());
    }

    #[tokio::test]
    async fn test_get_environment_not_found() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/endpoints/99"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "message": "Unable to find an environment with the specified identifier inside the database",
                "details": "object not found inside the database"
            })))
            .mount(&mock_server)
            .await;

        let err = api_for(&mock_server).get_environment(99).await.unwrap_err();

        assert_eq!(err.status(), Some(reqwest::StatusCode::NOT_FOUND));
        assert!(err.to_string().contains("Unable to find an environment"));
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/endpoints"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "message": "Unauthorized",
                "details": "A valid authorisation token is missing"
            })))
            .mount(&mock_server)
            .await;

        let err = api_for(&mock_server).list_environments().await.unwrap_err();
        assert_eq!(err.status(), Some(reqwest::StatusCode::UNAUTHORIZED));
    }

    #[tokio::test]
    async fn test_malformed_body_is_serialization_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/system/status"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let err = api_for(&mock_server).system_status().await.unwrap_err();
        assert!(matches!(err, ClientError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_get_json_generic() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/users/me"))
            .and(header("x-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Id": 1,
                "Username": "admin"
            })))
            .mount(&mock_server)
            .await;

        let user: serde_json::Value = api_for(&mock_server).get_json("/users/me").await.unwrap();
        assert_eq!(user["Username"], "admin");
    }
}
