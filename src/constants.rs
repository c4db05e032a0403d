//!

/// Network id value that matches any network.
pub const NETWORK_ID_WILDCARD: &str = "*";
/// Environment variable read for the signing mnemonic.
pub const DEFAULT_MNEMONIC_ENV_VAR: &str = "MNEMONIC";
/// BIP-44 Ethereum derivation path prefix, account index is appended.
pub const DEFAULT_DERIVATION_PATH: &str = "m/44'/60'/0'/0/";
/// Number of addresses derived by the HD wallet provider.
pub const DEFAULT_NUM_ADDRESSES: u32 = 1;
/// Default location of the networks file.
pub const DEFAULT_NETWORKS_FILE_NAME: &str = "configs/networks.toml";
/// Prefix for environment variables overriding networks file values.
pub const ENV_OVERRIDE_PREFIX: &str = "DEPLOY_NETWORKS";
