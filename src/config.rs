//! Static networks file, loaded once at startup into an [`EnvironmentRegistry`].
//!
//! ```toml
//! [networks.development]
//! host = "127.0.0.1"
//! port = 7545
//! network_id = "*"
//!
//! [networks.ropsten]
//! network_id = 3
//! gas = 4000000
//! provider = { url = "https://ropsten.infura.io/v3/${INFURA_PROJECT_ID}" }
//!
//! [solc.optimizer]
//! enabled = true
//! runs = 200
//! ```
//!
//! Values can be overridden from the environment, e.g.
//! `DEPLOY_NETWORKS_NETWORKS__ROPSTEN__GAS=5000000`.

use std::path::Path;

use config::{Config, Environment, File, FileFormat, Source};
use indexmap::IndexMap;
use serde::Deserialize;
use url::Url;

use crate::constants;
use crate::errors::NetworkConfigError;
use crate::provider::{HdWalletProvider, HdWalletProviderFactory, ProviderBinding};
use crate::registry::{EnvironmentDefinition, EnvironmentRegistry};
use crate::types::{CompilerOptions, NetworkId, RawNetworkId};
use crate::utils;

/// Parsed networks file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetworksFile {
    /// Network definitions, in file order
    #[serde(default)]
    pub networks: IndexMap<String, NetworkEntry>,
    /// Compiler options for networks that don't set their own
    #[serde(default)]
    pub solc: Option<CompilerOptions>,
}

/// One `[networks.<name>]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkEntry {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub provider: Option<ProviderEntry>,
    pub network_id: RawNetworkId,
    #[serde(alias = "gas_limit")]
    pub gas: Option<u64>,
    pub solc: Option<CompilerOptions>,
}

/// HD wallet provider settings, the mnemonic itself is never part of the file.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderEntry {
    /// JSON-RPC endpoint, `${VAR}` placeholders are expanded from the environment
    pub url: String,
    #[serde(default)]
    pub address_index: u32,
    #[serde(default = "default_num_addresses")]
    pub num_addresses: u32,
    #[serde(default = "default_derivation_path")]
    pub derivation_path: String,
}

fn default_num_addresses() -> u32 {
    constants::DEFAULT_NUM_ADDRESSES
}

fn default_derivation_path() -> String {
    constants::DEFAULT_DERIVATION_PATH.to_string()
}

impl NetworksFile {
    /// Read a TOML networks file, applying environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, NetworkConfigError> {
        let file = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        Self::build(file)
    }

    /// Parse networks from TOML text, applying environment overrides.
    pub fn from_toml(contents: &str) -> Result<Self, NetworkConfigError> {
        Self::build(File::from_str(contents, FileFormat::Toml))
    }

    fn build<S>(source: S) -> Result<Self, NetworkConfigError>
    where
        S: Source + Send + Sync + 'static,
    {
        let settings = Config::builder()
            .add_source(source)
            .add_source(
                Environment::with_prefix(constants::ENV_OVERRIDE_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Register every network, in file order, into a new registry.
    pub fn into_registry(self) -> Result<EnvironmentRegistry<HdWalletProvider>, NetworkConfigError> {
        let mut registry = EnvironmentRegistry::new();
        for (name, entry) in self.networks {
            let definition = entry.into_definition(&name, self.solc.as_ref())?;
            registry.register(name, definition)?;
        }
        utils::log_environments(&registry);
        Ok(registry)
    }
}

impl NetworkEntry {
    fn into_definition(
        self,
        name: &str,
        default_solc: Option<&CompilerOptions>,
    ) -> Result<EnvironmentDefinition<HdWalletProvider>, NetworkConfigError> {
        let provider = match self.provider {
            Some(entry) => Some(entry.into_binding(name, &self.network_id)?),
            None => None,
        };
        Ok(EnvironmentDefinition {
            host: self.host,
            port: self.port,
            provider,
            network_id: self.network_id,
            gas_limit: self.gas,
            compiler_options: self.solc.or_else(|| default_solc.cloned()),
        })
    }
}

impl ProviderEntry {
    fn into_binding(
        self,
        name: &str,
        network_id: &RawNetworkId,
    ) -> Result<ProviderBinding<HdWalletProvider>, NetworkConfigError> {
        let raw_url = utils::expand_env_placeholders(&self.url)?;
        // ParseError messages don't echo the url, which may carry an api key
        let url = Url::parse(&raw_url)
            .map_err(|e| NetworkConfigError::invalid(name, format!("invalid provider url: {e}")))?;

        // numeric network ids double as the signing chain id
        let chain_id = match network_id.parse() {
            Ok(NetworkId::Id(chain_id)) => chain_id,
            Ok(NetworkId::Any) => {
                return Err(NetworkConfigError::invalid(
                    name,
                    "provider networks need a numeric network_id to sign with",
                ))
            }
            Err(reason) => return Err(NetworkConfigError::invalid(name, reason)),
        };

        let factory = HdWalletProviderFactory::new()
            .with_address_index(self.address_index)
            .with_num_addresses(self.num_addresses)
            .with_derivation_path(self.derivation_path)
            .with_chain_id(chain_id);
        Ok(ProviderBinding::new(url, factory))
    }
}

/// Load a networks file straight into a registry.
pub fn load_registry(
    path: impl AsRef<Path>,
) -> Result<EnvironmentRegistry<HdWalletProvider>, NetworkConfigError> {
    NetworksFile::load(path)?.into_registry()
}

/// Load `configs/networks.toml` into a registry.
pub fn load_default_registry() -> Result<EnvironmentRegistry<HdWalletProvider>, NetworkConfigError> {
    load_registry(constants::DEFAULT_NETWORKS_FILE_NAME)
}
