//! Data returned by the Portainer management endpoints.
//!
//! Portainer serialises its models with `PascalCase` keys and calls managed
//! environments "endpoints"; the Rust names here use "environment" throughout.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a managed environment.
pub type EnvironmentId = u64;

/// Sub-APIs that Portainer reverse-proxies for an environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubApi {
    /// The Docker engine API, mounted at `/endpoints/{id}/docker`.
    Docker,
    /// The Kubernetes API, mounted at `/endpoints/{id}/kubernetes`.
    Kubernetes,
}

impl SubApi {
    /// Path segment under which Portainer mounts this sub-API.
    #[must_use]
    pub const fn mount_point(self) -> &'static str {
        match self {
            Self::Docker => "docker",
            Self::Kubernetes => "kubernetes",
        }
    }
}

impl fmt::Display for SubApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mount_point())
    }
}

/// Response of `GET /system/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemStatus {
    /// Server version, e.g. `2.19.4`.
    #[serde(rename = "Version")]
    pub version: String,
    /// Unique identifier of the Portainer instance.
    #[serde(rename = "InstanceID", default)]
    pub instance_id: String,
}

/// Kind of a managed environment.
///
/// Portainer encodes this as an integer; values this crate does not know are
/// kept in [`EnvironmentType::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum EnvironmentType {
    /// Docker engine reached directly.
    Docker,
    /// Portainer agent running on Docker.
    AgentOnDocker,
    /// Azure Container Instances.
    Azure,
    /// Edge agent running on Docker.
    EdgeAgentOnDocker,
    /// Kubernetes cluster Portainer runs inside.
    KubernetesLocal,
    /// Portainer agent running on Kubernetes.
    AgentOnKubernetes,
    /// Edge agent running on Kubernetes.
    EdgeAgentOnKubernetes,
    /// Unrecognised type code.
    Other(u8),
}

impl EnvironmentType {
    /// The sub-API that proxied requests for this environment should target.
    ///
    /// Returns `None` for environments that expose neither (e.g. Azure).
    #[must_use]
    pub const fn sub_api(self) -> Option<SubApi> {
        match self {
            Self::Docker | Self::AgentOnDocker | Self::EdgeAgentOnDocker => Some(SubApi::Docker),
            Self::KubernetesLocal | Self::AgentOnKubernetes | Self::EdgeAgentOnKubernetes => {
                Some(SubApi::Kubernetes)
            }
            Self::Azure | Self::Other(_) => None,
        }
    }
}

impl From<u8> for EnvironmentType {
    fn from(code: u8) -> Self {
        match code {
            1 => Self::Docker,
            2 => Self::AgentOnDocker,
            3 => Self::Azure,
            4 => Self::EdgeAgentOnDocker,
            5 => Self::KubernetesLocal,
            6 => Self::AgentOnKubernetes,
            7 => Self::EdgeAgentOnKubernetes,
            other => Self::Other(other),
        }
    }
}

impl From<EnvironmentType> for u8 {
    fn from(kind: EnvironmentType) -> Self {
        match kind {
            EnvironmentType::Docker => 1,
            EnvironmentType::AgentOnDocker => 2,
            EnvironmentType::Azure => 3,
            EnvironmentType::EdgeAgentOnDocker => 4,
            EnvironmentType::KubernetesLocal => 5,
            EnvironmentType::AgentOnKubernetes => 6,
            EnvironmentType::EdgeAgentOnKubernetes => 7,
            EnvironmentType::Other(code) => code,
        }
    }
}

/// Reachability reported by Portainer for an environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum EnvironmentStatus {
    /// The environment answered its last health check.
    Up,
    /// The environment did not answer its last health check.
    Down,
    /// Unrecognised status code.
    Other(u8),
}

impl From<u8> for EnvironmentStatus {
    fn from(code: u8) -> Self {
        match code {
            1 => Self::Up,
            2 => Self::Down,
            other => Self::Other(other),
        }
    }
}

impl From<EnvironmentStatus> for u8 {
    fn from(status: EnvironmentStatus) -> Self {
        match status {
            EnvironmentStatus::Up => 1,
            EnvironmentStatus::Down => 2,
            EnvironmentStatus::Other(code) => code,
        }
    }
}

/// A managed environment (a Portainer "endpoint").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    /// Environment identifier used in proxy URLs.
    #[serde(rename = "Id")]
    pub id: EnvironmentId,
    /// Display name.
    #[serde(rename = "Name")]
    pub name: String,
    /// Kind of environment.
    #[serde(rename = "Type")]
    pub kind: EnvironmentType,
    /// Address Portainer uses to reach the environment.
    #[serde(rename = "URL", default)]
    pub url: String,
    /// Last known reachability.
    #[serde(rename = "Status")]
    pub status: EnvironmentStatus,
    /// Environment group the environment belongs to.
    #[serde(rename = "GroupId", default)]
    pub group_id: u64,
    /// Public address shown to users, if configured.
    #[serde(rename = "PublicURL", default)]
    pub public_url: String,
}

impl Environment {
    /// Shorthand for `self.kind.sub_api()`.
    #[must_use]
    pub const fn sub_api(&self) -> Option<SubApi> {
        self.kind.sub_api()
    }

    /// Whether Portainer last saw the environment as up.
    #[must_use]
    pub const fn is_up(&self) -> bool {
        matches!(self.status, EnvironmentStatus::Up)
    }
}
