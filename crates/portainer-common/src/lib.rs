//! # portainer-common
//!
//! Configuration and data types shared by the Portainer client crates.
//!
//! This crate has no networking of its own. It provides:
//! - [`ClientConfig`], the immutable connection settings for a Portainer server
//! - [`SubApi`], the sub-APIs the server can reverse-proxy to
//! - Typed models for the management endpoints ([`Environment`], [`SystemStatus`])
//!
//! ## Example
//!
//! ```
//! use portainer_common::ClientConfig;
//!
//! let config = ClientConfig::new("portainer.example.com:9443", "ptr_abc123")
//!     .with_base_path("/portainer/api")
//!     .with_skip_tls_verify(true);
//!
//! assert_eq!(config.base_url(), "https://portainer.example.com:9443/portainer/api");
//! ```

/// Client configuration and loading from files or the environment.
pub mod config;
/// Configuration errors.
pub mod error;
/// Models returned by the Portainer management API.
pub mod models;

pub use config::{ClientConfig, DEFAULT_BASE_PATH, DEFAULT_SCHEME};
pub use error::ConfigError;
pub use models::{
    Environment, EnvironmentId, EnvironmentStatus, EnvironmentType, SubApi, SystemStatus,
};
