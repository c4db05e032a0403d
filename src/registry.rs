//! Environment registry: named deployment targets, validated at registration
//! and resolved one at a time into immutable snapshots.

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::errors::NetworkConfigError;
use crate::provider::{HdWalletProvider, ProviderBinding};
use crate::secret::SecretProvider;
use crate::types::{CompilerOptions, NetworkId, RawNetworkId};

/// One named deployment target as written by the user.
///
/// Exactly one of `host`/`port` or `provider` must be set, checked by
/// [`EnvironmentRegistry::register`].
#[derive(Debug, Clone)]
pub struct EnvironmentDefinition<H = HdWalletProvider> {
    /// Direct, unauthenticated connection host
    pub host: Option<String>,
    /// Direct connection port, required with `host`
    pub port: Option<u16>,
    /// Lazily constructed signing provider
    pub provider: Option<ProviderBinding<H>>,
    /// `"*"` or a non-negative integer
    pub network_id: RawNetworkId,
    /// Upper bound on transaction gas, tool default when absent
    pub gas_limit: Option<u64>,
    /// Passed through to the build tool
    pub compiler_options: Option<CompilerOptions>,
}

impl<H> EnvironmentDefinition<H> {
    /// Definition for a node reached directly over `host:port`.
    pub fn direct(host: impl Into<String>, port: u16, network_id: impl Into<RawNetworkId>) -> Self {
        EnvironmentDefinition {
            host: Some(host.into()),
            port: Some(port),
            provider: None,
            network_id: network_id.into(),
            gas_limit: None,
            compiler_options: None,
        }
    }

    /// Definition for a node reached through a provider built from a secret.
    pub fn with_provider(provider: ProviderBinding<H>, network_id: impl Into<RawNetworkId>) -> Self {
        EnvironmentDefinition {
            host: None,
            port: None,
            provider: Some(provider),
            network_id: network_id.into(),
            gas_limit: None,
            compiler_options: None,
        }
    }

    pub fn gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }

    pub fn compiler_options(mut self, options: CompilerOptions) -> Self {
        self.compiler_options = Some(options);
        self
    }

    fn validate(self, name: &str) -> Result<Environment<H>, NetworkConfigError> {
        if name.trim().is_empty() {
            return Err(NetworkConfigError::invalid(name, "environment name is empty"));
        }

        let connection = match (self.host, self.port, self.provider) {
            (Some(host), Some(port), None) => {
                if host.trim().is_empty() {
                    return Err(NetworkConfigError::invalid(name, "host is empty"));
                }
                Connection::Direct { host, port }
            }
            (None, None, Some(provider)) => Connection::Provider(provider),
            (None, None, None) => {
                return Err(NetworkConfigError::invalid(
                    name,
                    "either host/port or a provider is required",
                ))
            }
            (_, _, Some(_)) => {
                return Err(NetworkConfigError::invalid(
                    name,
                    "host/port and provider are mutually exclusive",
                ))
            }
            (Some(_), None, None) => {
                return Err(NetworkConfigError::invalid(name, "host is set without a port"))
            }
            (None, Some(_), None) => {
                return Err(NetworkConfigError::invalid(name, "port is set without a host"))
            }
        };

        let network_id = self
            .network_id
            .parse()
            .map_err(|reason| NetworkConfigError::invalid(name, reason))?;

        Ok(Environment {
            connection,
            network_id,
            gas_limit: self.gas_limit,
            compiler_options: self.compiler_options,
        })
    }
}

#[derive(Debug, Clone)]
enum Connection<H> {
    Direct { host: String, port: u16 },
    Provider(ProviderBinding<H>),
}

/// Validated definition, stored by the registry.
#[derive(Debug, Clone)]
struct Environment<H> {
    connection: Connection<H>,
    network_id: NetworkId,
    gas_limit: Option<u64>,
    compiler_options: Option<CompilerOptions>,
}

/// Endpoint of a resolved environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint<H> {
    Direct { host: String, port: u16 },
    /// Handle freshly built by the environment's provider factory.
    Provider(H),
}

impl<H> Endpoint<H> {
    /// `(host, port)` for direct endpoints.
    pub fn direct(&self) -> Option<(&str, u16)> {
        match self {
            Endpoint::Direct { host, port } => Some((host.as_str(), *port)),
            Endpoint::Provider(_) => None,
        }
    }

    pub fn provider(&self) -> Option<&H> {
        match self {
            Endpoint::Direct { .. } => None,
            Endpoint::Provider(handle) => Some(handle),
        }
    }
}

/// Ready-to-use snapshot of one environment.
#[derive(Debug)]
pub struct ResolvedConfig<H = HdWalletProvider> {
    name: String,
    endpoint: Endpoint<H>,
    network_id: NetworkId,
    gas_limit: Option<u64>,
    compiler_options: Option<CompilerOptions>,
}

impl<H> ResolvedConfig<H> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn endpoint(&self) -> &Endpoint<H> {
        &self.endpoint
    }

    pub fn into_endpoint(self) -> Endpoint<H> {
        self.endpoint
    }

    pub fn network_id(&self) -> NetworkId {
        self.network_id
    }

    pub fn gas_limit(&self) -> Option<u64> {
        self.gas_limit
    }

    pub fn compiler_options(&self) -> Option<&CompilerOptions> {
        self.compiler_options.as_ref()
    }

    /// Check the network id a node reported against this environment.
    pub fn ensure_network(&self, reported: u64) -> Result<(), NetworkConfigError> {
        if self.network_id.matches(reported) {
            return Ok(());
        }
        Err(NetworkConfigError::NetworkMismatch {
            name: self.name.clone(),
            expected: self.network_id,
            reported,
        })
    }
}

/// Named environments in registration order.
#[derive(Debug, Clone)]
pub struct EnvironmentRegistry<H = HdWalletProvider> {
    environments: IndexMap<String, Environment<H>>,
}

impl<H> Default for EnvironmentRegistry<H> {
    fn default() -> Self {
        EnvironmentRegistry {
            environments: IndexMap::new(),
        }
    }
}

impl<H> EnvironmentRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and add a definition under `name`.
    ///
    /// The registry is unchanged when this fails.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        definition: EnvironmentDefinition<H>,
    ) -> Result<(), NetworkConfigError> {
        let name = name.into();
        if self.environments.contains_key(&name) {
            return Err(NetworkConfigError::DuplicateEnvironment(name));
        }
        let environment = definition.validate(&name)?;
        debug!(network = %name, network_id = %environment.network_id, "Registered environment");
        self.environments.insert(name, environment);
        Ok(())
    }

    /// Resolve `name` into a fresh snapshot.
    ///
    /// Provider-based environments ask `secrets` for the signing secret here
    /// and build a new provider on every call.
    pub fn resolve<S>(&self, name: &str, secrets: &S) -> Result<ResolvedConfig<H>, NetworkConfigError>
    where
        S: SecretProvider + ?Sized,
    {
        let environment = self
            .environments
            .get(name)
            .ok_or_else(|| NetworkConfigError::UnknownEnvironment(name.to_string()))?;

        let endpoint = match &environment.connection {
            Connection::Direct { host, port } => Endpoint::Direct {
                host: host.clone(),
                port: *port,
            },
            Connection::Provider(binding) => {
                let secret = secrets
                    .secret()
                    .map_err(NetworkConfigError::SecretProvider)?
                    .filter(|secret| !secret.is_blank())
                    .ok_or_else(|| NetworkConfigError::SecretRequired(name.to_string()))?;
                let handle = binding
                    .connect(&secret)
                    .map_err(NetworkConfigError::ProviderFactory)?;
                Endpoint::Provider(handle)
            }
        };

        info!(network = %name, network_id = %environment.network_id, "Resolved environment");
        Ok(ResolvedConfig {
            name: name.to_string(),
            endpoint,
            network_id: environment.network_id,
            gas_limit: environment.gas_limit,
            compiler_options: environment.compiler_options.clone(),
        })
    }

    /// Registered names in registration order. The iterator can be cloned to restart.
    pub fn list(&self) -> impl Iterator<Item = &str> + Clone + '_ {
        self.environments.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.environments.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.environments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.environments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{self, ProviderBinding};
    use crate::secret::{self, Secret};
    use url::Url;

    fn no_secret() -> impl SecretProvider {
        secret::from_fn(|| Ok(None))
    }

    fn echo_binding() -> ProviderBinding<String> {
        let url = Url::parse("https://ropsten.example.org/v3/key").unwrap();
        ProviderBinding::new(url, provider::from_fn(|_: &Secret, url: &Url| Ok(url.to_string())))
    }

    #[test]
    fn host_without_port_is_invalid() {
        let mut registry = EnvironmentRegistry::<String>::new();
        let mut definition = EnvironmentDefinition::direct("127.0.0.1", 7545, "*");
        definition.port = None;
        let err = registry.register("development", definition).unwrap_err();
        assert!(matches!(err, NetworkConfigError::InvalidDefinition { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn port_with_provider_is_invalid() {
        let mut registry = EnvironmentRegistry::<String>::new();
        let mut definition = EnvironmentDefinition::with_provider(echo_binding(), 3i64);
        definition.port = Some(8545);
        let err = registry.register("ropsten", definition).unwrap_err();
        assert!(matches!(err, NetworkConfigError::InvalidDefinition { .. }));
    }

    #[test]
    fn empty_name_is_invalid() {
        let mut registry = EnvironmentRegistry::<String>::new();
        let err = registry
            .register(" ", EnvironmentDefinition::direct("127.0.0.1", 7545, "*"))
            .unwrap_err();
        assert!(matches!(err, NetworkConfigError::InvalidDefinition { .. }));
    }

    #[test]
    fn negative_network_id_is_invalid() {
        let mut registry = EnvironmentRegistry::<String>::new();
        let err = registry
            .register("development", EnvironmentDefinition::direct("127.0.0.1", 7545, -1i64))
            .unwrap_err();
        match err {
            NetworkConfigError::InvalidDefinition { name, reason } => {
                assert_eq!(name, "development");
                assert!(reason.contains("non-negative"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn blank_secret_counts_as_missing() {
        let mut registry = EnvironmentRegistry::<String>::new();
        registry
            .register("ropsten", EnvironmentDefinition::with_provider(echo_binding(), 3i64))
            .unwrap();
        let blank = secret::from_fn(|| Ok(Some(Secret::new("   "))));
        let err = registry.resolve("ropsten", &blank).unwrap_err();
        assert!(matches!(err, NetworkConfigError::SecretRequired(name) if name == "ropsten"));
        let err = registry.resolve("ropsten", &no_secret()).unwrap_err();
        assert!(matches!(err, NetworkConfigError::SecretRequired(_)));
    }

    #[test]
    fn mismatched_network_is_reported() {
        let mut registry = EnvironmentRegistry::<String>::new();
        registry
            .register("mainnet", EnvironmentDefinition::direct("127.0.0.1", 8545, 1i64))
            .unwrap();
        let resolved = registry.resolve("mainnet", &no_secret()).unwrap();
        assert!(resolved.ensure_network(1).is_ok());
        let err = resolved.ensure_network(3).unwrap_err();
        assert_eq!(
            err.to_string(),
            "network id mismatch for mainnet: expected 1, node reported 3"
        );
    }

    #[test]
    fn list_is_restartable() {
        let mut registry = EnvironmentRegistry::<String>::new();
        registry
            .register("development", EnvironmentDefinition::direct("127.0.0.1", 7545, "*"))
            .unwrap();
        registry
            .register("ropsten", EnvironmentDefinition::with_provider(echo_binding(), 3i64))
            .unwrap();
        let names = registry.list();
        let first: Vec<&str> = names.clone().collect();
        let second: Vec<&str> = names.collect();
        assert_eq!(first, vec!["development", "ropsten"]);
        assert_eq!(first, second);
    }
}
