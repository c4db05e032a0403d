//! Provider factories: turn a secret and an endpoint URL into a signing provider.

use std::fmt;
use std::sync::Arc;

use ethers::prelude::*;
use ethers::signers::coins_bip39::English;
use tracing::debug;
use url::Url;

use crate::constants;
use crate::errors::{BoxError, HdWalletError};
use crate::secret::Secret;
use crate::types::EthRpcClient;

/// Capability constructing a connection/signing provider on demand.
pub trait ProviderFactory<H>: Send + Sync {
    fn connect(&self, secret: &Secret, endpoint: &Url) -> Result<H, BoxError>;
}

/// Provider factory backed by a closure.
pub struct FnProviderFactory<F>(F);

/// Wrap a closure as a [`ProviderFactory`].
pub fn from_fn<H, F>(f: F) -> FnProviderFactory<F>
where
    F: Fn(&Secret, &Url) -> Result<H, BoxError> + Send + Sync,
{
    FnProviderFactory(f)
}

impl<H, F> ProviderFactory<H> for FnProviderFactory<F>
where
    F: Fn(&Secret, &Url) -> Result<H, BoxError> + Send + Sync,
{
    fn connect(&self, secret: &Secret, endpoint: &Url) -> Result<H, BoxError> {
        (self.0)(secret, endpoint)
    }
}

/// Endpoint URL paired with the factory that connects to it.
pub struct ProviderBinding<H> {
    url: Url,
    factory: Arc<dyn ProviderFactory<H>>,
}

impl<H> ProviderBinding<H> {
    pub fn new(url: Url, factory: impl ProviderFactory<H> + 'static) -> Self {
        ProviderBinding {
            url,
            factory: Arc::new(factory),
        }
    }

    /// Bind an already shared factory.
    pub fn shared(url: Url, factory: Arc<dyn ProviderFactory<H>>) -> Self {
        ProviderBinding { url, factory }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub(crate) fn connect(&self, secret: &Secret) -> Result<H, BoxError> {
        self.factory.connect(secret, &self.url)
    }
}

impl<H> Clone for ProviderBinding<H> {
    fn clone(&self) -> Self {
        ProviderBinding {
            url: self.url.clone(),
            factory: Arc::clone(&self.factory),
        }
    }
}

// Only the host is printed, paths and queries often carry api keys.
impl<H> fmt::Debug for ProviderBinding<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderBinding")
            .field("host", &self.url.host_str().unwrap_or_default())
            .finish_non_exhaustive()
    }
}

/// Signing JSON-RPC provider backed by accounts derived from a mnemonic.
#[derive(Debug)]
pub struct HdWalletProvider {
    /// Client signing with the account at the configured address index
    client: EthRpcClient,
    /// All derived addresses, starting at the address index
    addresses: Vec<Address>,
}

impl HdWalletProvider {
    pub fn client(&self) -> &EthRpcClient {
        &self.client
    }

    pub fn into_client(self) -> EthRpcClient {
        self.client
    }

    /// Address transactions are signed with.
    pub fn signer_address(&self) -> Address {
        self.client.address()
    }

    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }
}

/// Derives accounts from a mnemonic and wraps an HTTP provider in signer middleware.
///
/// Without [`with_chain_id`](Self::with_chain_id) the wallet signs for chain id 1
/// (mainnet), which nodes on any other network reject.
#[derive(Debug, Clone)]
pub struct HdWalletProviderFactory {
    address_index: u32,
    num_addresses: u32,
    derivation_path: String,
    chain_id: Option<u64>,
}

impl Default for HdWalletProviderFactory {
    fn default() -> Self {
        HdWalletProviderFactory {
            address_index: 0,
            num_addresses: constants::DEFAULT_NUM_ADDRESSES,
            derivation_path: constants::DEFAULT_DERIVATION_PATH.to_string(),
            chain_id: None,
        }
    }
}

impl HdWalletProviderFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the signing account.
    pub fn with_address_index(mut self, index: u32) -> Self {
        self.address_index = index;
        self
    }

    pub fn with_num_addresses(mut self, count: u32) -> Self {
        self.num_addresses = count;
        self
    }

    /// Path prefix the account index is appended to, e.g. `m/44'/60'/0'/0/`.
    pub fn with_derivation_path(mut self, path: impl Into<String>) -> Self {
        self.derivation_path = path.into();
        self
    }

    /// Chain id set on signed transactions.
    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    /// Derive `num_addresses` wallets starting at `address_index`.
    pub fn derive_wallets(&self, secret: &Secret) -> Result<Vec<LocalWallet>, HdWalletError> {
        if self.num_addresses == 0 {
            return Err(HdWalletError::NoAddresses);
        }
        (self.address_index..self.address_index.saturating_add(self.num_addresses))
            .map(|index| self.derive_wallet(secret, index))
            .collect()
    }

    fn derive_wallet(&self, secret: &Secret, index: u32) -> Result<LocalWallet, HdWalletError> {
        let path = format!("{}{}", self.derivation_path, index);
        let wallet = MnemonicBuilder::<English>::default()
            .phrase(secret.expose())
            .derivation_path(&path)
            .and_then(|builder| builder.build())
            .map_err(|_| HdWalletError::Derivation(path))?;
        Ok(match self.chain_id {
            Some(chain_id) => wallet.with_chain_id(chain_id),
            None => wallet,
        })
    }
}

impl ProviderFactory<HdWalletProvider> for HdWalletProviderFactory {
    fn connect(&self, secret: &Secret, endpoint: &Url) -> Result<HdWalletProvider, BoxError> {
        let mut wallets = self.derive_wallets(secret)?;
        let addresses = wallets.iter().map(|wallet| wallet.address()).collect();
        let signer = wallets.remove(0);

        let provider = Provider::<Http>::try_from(endpoint.as_str())
            .map_err(|e| HdWalletError::Endpoint(e.to_string()))?;
        debug!(
            host = endpoint.host_str().unwrap_or_default(),
            signer = ?signer.address(),
            "Created HD wallet provider"
        );

        Ok(HdWalletProvider {
            client: SignerMiddleware::new(provider, signer),
            addresses,
        })
    }
}
