//! Error types for the deploy networks module

use crate::types::NetworkId;

/// Boxed error surfaced by secret providers and provider factories.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(thiserror::Error, Debug)]
pub enum NetworkConfigError {
    #[error("environment already registered: {0}")]
    DuplicateEnvironment(String),
    #[error("invalid definition for environment {name}: {reason}")]
    InvalidDefinition { name: String, reason: String },
    #[error("unknown environment: {0}")]
    UnknownEnvironment(String),
    #[error("environment {0} requires a signing secret but none was provided")]
    SecretRequired(String),
    /// Failure raised by the secret provider, carried as-is.
    #[error(transparent)]
    SecretProvider(BoxError),
    /// Failure raised by a provider factory, carried as-is.
    #[error(transparent)]
    ProviderFactory(BoxError),
    #[error("failed to load networks config: {0}")]
    ConfigLoad(#[from] config::ConfigError),
    #[error("environment variable {0} referenced in networks config is not set")]
    MissingVariable(String),
    #[error("network id mismatch for {name}: expected {expected}, node reported {reported}")]
    NetworkMismatch {
        name: String,
        expected: NetworkId,
        reported: u64,
    },
    #[error("failed to query remote network id: {0}")]
    RemoteQuery(String),
}

impl NetworkConfigError {
    pub(crate) fn invalid(name: &str, reason: impl Into<String>) -> Self {
        NetworkConfigError::InvalidDefinition {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Failures of the HD wallet provider factory.
///
/// Messages never include the mnemonic or any word of it, which is why the
/// underlying wallet errors are not chained.
#[derive(thiserror::Error, Debug)]
pub enum HdWalletError {
    #[error("failed to derive signing key at {0} from mnemonic")]
    Derivation(String),
    #[error("invalid rpc endpoint: {0}")]
    Endpoint(String),
    #[error("num_addresses must be at least 1")]
    NoAddresses,
}
