//! Named Ethereum deployment networks: define them once, resolve one at a time.
//!
//! A registry holds validated environment definitions. Resolving an
//! environment yields an immutable [`ResolvedConfig`] with either a direct
//! `host:port` endpoint or a signing provider built on demand from a secret
//! (mnemonic) that is only requested at resolution time.

pub mod config;
pub mod constants;
pub mod network;
pub mod provider;
pub mod registry;
pub mod secret;
pub mod types;
pub mod utils;
mod errors;

pub use crate::errors::{BoxError, HdWalletError, NetworkConfigError};
pub use crate::provider::{HdWalletProvider, HdWalletProviderFactory, ProviderBinding, ProviderFactory};
pub use crate::registry::{Endpoint, EnvironmentDefinition, EnvironmentRegistry, ResolvedConfig};
pub use crate::secret::{EnvSecretProvider, Secret, SecretProvider};
pub use crate::types::{CompilerOptions, EthRpcClient, NetworkId, OptimizerSettings, RawNetworkId};
