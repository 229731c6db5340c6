//! Portainer Proxy Demo
//!
//! Lists the environments visible to an API key, then forwards a request to
//! the native API of one of them through Portainer.
//!
//! # Usage
//!
//! ```bash
//! # List containers on environment 1
//! PORTAINER_API_KEY=ptr_... cargo run --example docker_proxy_demo -- \
//!     --host portainer.example.com:9443 --environment-id 1
//!
//! # Self-signed Portainer certificate, custom path on a Kubernetes environment
//! PORTAINER_API_KEY=ptr_... cargo run --example docker_proxy_demo -- \
//!     --host localhost:9443 --skip-tls-verify \
//!     --environment-id 3 --path /api/v1/namespaces
//! ```

use anyhow::{Context, Result, bail};
use clap::Parser;

use portainer_client::{PortainerClient, ProxyRequest};
use portainer_common::{ClientConfig, SubApi};

#[derive(Parser, Debug)]
#[command(author, version, about = "Portainer proxy forwarding demo")]
struct Args {
    /// Portainer host, including the port
    #[arg(long, env = "PORTAINER_HOST")]
    host: String,

    /// API key for authentication
    #[arg(long, env = "PORTAINER_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Base path of the Portainer API
    #[arg(long, default_value = "/api")]
    base_path: String,

    /// URL scheme (http or https)
    #[arg(long, default_value = "https")]
    scheme: String,

    /// Accept self-signed certificates
    #[arg(long)]
    skip_tls_verify: bool,

    /// Environment to forward the request to (defaults to the first one listed)
    #[arg(long)]
    environment_id: Option<u64>,

    /// Path on the environment's native API
    #[arg(long)]
    path: Option<String>,

    /// HTTP method for the proxied request
    #[arg(long, default_value = "GET")]
    method: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = ClientConfig::new(args.host, args.api_key)
        .with_base_path(args.base_path)
        .with_scheme(args.scheme)
        .with_skip_tls_verify(args.skip_tls_verify);

    let client = PortainerClient::new(config)?;

    let status = client.api().system_status().await?;
    println!("Connected to Portainer {}", status.version);

    let environments = client.api().list_environments().await?;
    println!("\n{} environment(s):", environments.len());
    for environment in &environments {
        println!(
            "  [{}] {} ({:?}, {:?})",
            environment.id, environment.name, environment.kind, environment.status
        );
    }

    let environment = match args.environment_id {
        Some(id) => client.api().get_environment(id).await?,
        None => environments
            .into_iter()
            .next()
            .context("no environments available")?,
    };

    let Some(sub_api) = environment.sub_api() else {
        bail!(
            "environment {} ({:?}) exposes neither a Docker nor a Kubernetes API",
            environment.id,
            environment.kind
        );
    };

    let api_path = args.path.unwrap_or_else(|| match sub_api {
        SubApi::Docker => "/containers/json".to_string(),
        SubApi::Kubernetes => "/api/v1/pods".to_string(),
    });

    println!(
        "\n{} {}",
        args.method,
        client.proxy().target_url(sub_api, environment.id, &api_path)
    );

    let request = ProxyRequest::builder()
        .method(args.method)
        .api_path(api_path)
        .build();

    let response = client
        .proxy()
        .forward(sub_api, environment.id, request)
        .await?;

    println!("Status: {}", response.status());
    println!("{}", response.text().await?);

    Ok(())
}
