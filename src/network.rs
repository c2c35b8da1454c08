use std::fmt;
use std::str::FromStr;

use crate::config::ConfigError;
use crate::{GOERLI_SUBGRAPH_URL, MAINNET_SUBGRAPH_URL};

/// Network id that selects the test network subgraph
const GOERLI_ID: &str = "5";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Network {
    #[default]
    Mainnet,
    Goerli,
}

impl Network {
    /// Resolves a raw network id the way the environment path does.
    ///
    /// Only `"5"` selects Goerli. Anything else, including a missing value,
    /// falls back to mainnet without complaint.
    pub fn from_id(id: Option<&str>) -> Self {
        match id {
            Some(GOERLI_ID) => Network::Goerli,
            Some(other) if !other.is_empty() => {
                tracing::debug!(id = other, "network id is not 5, using mainnet");
                Network::Mainnet
            }
            _ => Network::Mainnet,
        }
    }

    pub fn subgraph_url(&self) -> &'static str {
        match self {
            Network::Mainnet => MAINNET_SUBGRAPH_URL,
            Network::Goerli => GOERLI_SUBGRAPH_URL,
        }
    }

    pub fn chain_id(&self) -> u64 {
        match self {
            Network::Mainnet => 1,
            Network::Goerli => 5,
        }
    }
}

/// Strict parse, used where a typo should be reported instead of ignored
impl FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "mainnet" => Ok(Network::Mainnet),
            "5" | "goerli" => Ok(Network::Goerli),
            _ => Err(ConfigError::UnknownNetwork(s.to_string())),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Mainnet => write!(f, "mainnet"),
            Network::Goerli => write!(f, "goerli"),
        }
    }
}
