//! Shared value types for network definitions.

use std::fmt;
use std::str::FromStr;

use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Provider};
use ethers::signers::LocalWallet;
use serde::{Deserialize, Serialize};

use crate::constants::NETWORK_ID_WILDCARD;

pub type EthRpcClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Validated network id match policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkId {
    /// Matches whatever network the node reports.
    Any,
    /// Must equal the node's reported network id.
    Id(u64),
}

impl NetworkId {
    /// Check a node's reported network id against this policy.
    pub fn matches(&self, reported: u64) -> bool {
        match self {
            NetworkId::Any => true,
            NetworkId::Id(id) => *id == reported,
        }
    }

    /// Numeric id, `None` for the wildcard.
    pub fn id(&self) -> Option<u64> {
        match self {
            NetworkId::Any => None,
            NetworkId::Id(id) => Some(*id),
        }
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkId::Any => f.write_str(NETWORK_ID_WILDCARD),
            NetworkId::Id(id) => write!(f, "{id}"),
        }
    }
}

impl From<u64> for NetworkId {
    fn from(id: u64) -> Self {
        NetworkId::Id(id)
    }
}

impl FromStr for NetworkId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == NETWORK_ID_WILDCARD {
            return Ok(NetworkId::Any);
        }
        s.parse::<u64>().map(NetworkId::Id).map_err(|_| {
            format!("network_id must be \"{NETWORK_ID_WILDCARD}\" or a non-negative integer, got {s:?}")
        })
    }
}

/// Network id as written in a definition, before validation.
///
/// Config files hold either `"*"` or an integer; environment overrides may
/// turn the integer into a string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawNetworkId {
    Number(i64),
    Text(String),
}

impl RawNetworkId {
    /// Wildcard network id.
    pub fn any() -> Self {
        RawNetworkId::Text(NETWORK_ID_WILDCARD.to_string())
    }

    pub fn parse(&self) -> Result<NetworkId, String> {
        match self {
            RawNetworkId::Number(n) => u64::try_from(*n)
                .map(NetworkId::Id)
                .map_err(|_| format!("network_id must be non-negative, got {n}")),
            RawNetworkId::Text(s) => s.parse(),
        }
    }
}

impl From<i64> for RawNetworkId {
    fn from(n: i64) -> Self {
        RawNetworkId::Number(n)
    }
}

impl From<u64> for RawNetworkId {
    fn from(n: u64) -> Self {
        match i64::try_from(n) {
            Ok(n) => RawNetworkId::Number(n),
            Err(_) => RawNetworkId::Text(n.to_string()),
        }
    }
}

impl From<&str> for RawNetworkId {
    fn from(s: &str) -> Self {
        RawNetworkId::Text(s.to_string())
    }
}

impl From<NetworkId> for RawNetworkId {
    fn from(id: NetworkId) -> Self {
        match id {
            NetworkId::Any => RawNetworkId::any(),
            NetworkId::Id(id) => id.into(),
        }
    }
}

/// Compiler settings handed through to the build tool untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimizer: Option<OptimizerSettings>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizerSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Trade-off between deployment and runtime cost.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runs: Option<u64>,
}

impl CompilerOptions {
    /// Optimizer enabled with the given run count.
    pub fn optimized(runs: u64) -> Self {
        CompilerOptions {
            optimizer: Some(OptimizerSettings {
                enabled: Some(true),
                runs: Some(runs),
            }),
        }
    }
}
