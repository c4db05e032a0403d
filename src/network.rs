//!

use std::net::Ipv6Addr;

use ethers::prelude::*;
use tracing::{debug, info};
use url::Url;

use crate::errors::NetworkConfigError;
use crate::provider::HdWalletProvider;
use crate::registry::{Endpoint, ResolvedConfig};
use crate::types::NetworkId;

/// Fetch the network id a node reports through `net_version`.
pub async fn remote_network_id<M: Middleware>(client: &M) -> Result<u64, NetworkConfigError> {
    let version = client
        .get_net_version()
        .await
        .map_err(|e| NetworkConfigError::RemoteQuery(e.to_string()))?;
    version.trim().parse::<u64>().map_err(|_| {
        NetworkConfigError::RemoteQuery(format!("node reported non-numeric network id {version:?}"))
    })
}

/// JSON-RPC URL for a direct `host:port` endpoint, IPv6 hosts are bracketed.
pub(crate) fn direct_url(host: &str, port: u16) -> Result<Url, NetworkConfigError> {
    let host = match host.parse::<Ipv6Addr>() {
        Ok(ip) => format!("[{}]", ip),
        Err(_) => host.to_string(),
    };
    Url::parse(&format!("http://{}:{}", host, port))
        .map_err(|e| NetworkConfigError::RemoteQuery(format!("invalid direct endpoint: {e}")))
}

/// Instantiate an unauthenticated RPC client for a direct `host:port` endpoint.
pub fn direct_client(host: &str, port: u16) -> Result<Provider<Http>, NetworkConfigError> {
    let rpc_url = direct_url(host, port)?;
    Provider::<Http>::try_from(rpc_url.as_str())
        .map_err(|e| NetworkConfigError::RemoteQuery(e.to_string()))
}

/// Check the node `client` talks to against a resolved environment.
///
/// Wildcard environments match any network and are not queried.
pub async fn ensure_remote_network<H, M: Middleware>(
    resolved: &ResolvedConfig<H>,
    client: &M,
) -> Result<(), NetworkConfigError> {
    if resolved.network_id() == NetworkId::Any {
        debug!(network = resolved.name(), "Wildcard network id, skipping remote check");
        return Ok(());
    }

    let reported = remote_network_id(client).await?;
    resolved.ensure_network(reported)?;

    info!(network = resolved.name(), reported, "Remote network id verified");
    Ok(())
}

/// Check the node behind a resolved environment runs the expected network.
pub async fn verify_remote_network(
    resolved: &ResolvedConfig<HdWalletProvider>,
) -> Result<(), NetworkConfigError> {
    match resolved.endpoint() {
        Endpoint::Direct { host, port } => {
            ensure_remote_network(resolved, &direct_client(host, *port)?).await
        }
        Endpoint::Provider(handle) => ensure_remote_network(resolved, handle.client()).await,
    }
}
