//! Signing secrets and where they come from.

use std::env::{self, VarError};
use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::constants;
use crate::errors::BoxError;

/// Mnemonic (or other signing secret) held in memory only for as long as needed.
///
/// Has no `Display` or `Serialize`, `Debug` is redacted, and the contents are
/// wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Secret(value.into())
    }

    /// Borrow the raw secret, only for handing to key derivation.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

/// Capability producing the signing secret at resolution time.
pub trait SecretProvider {
    /// `Ok(None)` means no secret is available.
    fn secret(&self) -> Result<Option<Secret>, BoxError>;
}

/// Secret provider backed by a closure.
pub struct FnSecretProvider<F>(F);

/// Wrap a closure as a [`SecretProvider`].
pub fn from_fn<F>(f: F) -> FnSecretProvider<F>
where
    F: Fn() -> Result<Option<Secret>, BoxError>,
{
    FnSecretProvider(f)
}

impl<F> SecretProvider for FnSecretProvider<F>
where
    F: Fn() -> Result<Option<Secret>, BoxError>,
{
    fn secret(&self) -> Result<Option<Secret>, BoxError> {
        (self.0)()
    }
}

/// Reads the secret from an environment variable.
#[derive(Debug, Clone)]
pub struct EnvSecretProvider {
    var: String,
}

impl EnvSecretProvider {
    pub fn new(var: impl Into<String>) -> Self {
        EnvSecretProvider { var: var.into() }
    }

    /// Reads `MNEMONIC`.
    pub fn mnemonic() -> Self {
        Self::new(constants::DEFAULT_MNEMONIC_ENV_VAR)
    }

    pub fn var(&self) -> &str {
        &self.var
    }
}

impl Default for EnvSecretProvider {
    fn default() -> Self {
        Self::mnemonic()
    }
}

impl SecretProvider for EnvSecretProvider {
    fn secret(&self) -> Result<Option<Secret>, BoxError> {
        match env::var(&self.var) {
            Ok(value) => Ok(Some(Secret::new(value))),
            Err(VarError::NotPresent) => Ok(None),
            // VarError::NotUnicode carries the raw value, don't forward it
            Err(VarError::NotUnicode(_)) => {
                Err(format!("environment variable {} is not valid unicode", self.var).into())
            }
        }
    }
}
