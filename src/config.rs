use thiserror::Error;

use crate::cache::CacheConfig;
use crate::network::Network;
use crate::policy::DefaultOptions;
use crate::NETWORK_ENV_VAR;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown network: {0} (expected 1, 5, mainnet or goerli)")]
    UnknownNetwork(String),

    #[error("Unknown fetch policy: {0}")]
    UnknownFetchPolicy(String),
}

/// Everything needed to build a [crate::client::SubgraphClient]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub network: Network,
    pub endpoint: String,
    pub cache: CacheConfig,
    pub default_options: DefaultOptions,
}

impl ClientConfig {
    pub fn for_network(network: Network) -> Self {
        Self {
            network,
            endpoint: network.subgraph_url().to_string(),
            cache: CacheConfig::default(),
            default_options: DefaultOptions::default(),
        }
    }

    /// Reads the network id from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [ClientConfig::from_env] with a caller-supplied lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = lookup(NETWORK_ENV_VAR);
        let network = Network::from_id(raw.as_deref());
        tracing::debug!(
            raw = raw.as_deref().unwrap_or("<unset>"),
            %network,
            "resolved network from environment"
        );
        Self::for_network(network)
    }

    /// Points the transport somewhere else, e.g. a local mirror
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_default_options(mut self, options: DefaultOptions) -> Self {
        self.default_options = options;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::for_network(Network::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GOERLI_SUBGRAPH_URL, MAINNET_SUBGRAPH_URL};

    fn lookup_with(value: Option<&'static str>) -> impl Fn(&str) -> Option<String> {
        move |key| {
            assert_eq!(key, NETWORK_ENV_VAR);
            value.map(str::to_string)
        }
    }

    #[test]
    fn test_from_lookup_goerli() {
        let cfg = ClientConfig::from_lookup(lookup_with(Some("5")));
        assert_eq!(cfg.network, Network::Goerli);
        assert_eq!(cfg.endpoint, GOERLI_SUBGRAPH_URL);
    }

    #[test]
    fn test_from_lookup_unset_and_unknown() {
        for value in [None, Some("1"), Some("42"), Some("")] {
            let cfg = ClientConfig::from_lookup(lookup_with(value));
            assert_eq!(cfg.network, Network::Mainnet);
            assert_eq!(cfg.endpoint, MAINNET_SUBGRAPH_URL);
        }
    }

    #[test]
    fn test_defaults_disable_typename_and_cache_reads() {
        let cfg = ClientConfig::default();
        assert!(!cfg.cache.add_typename);
        assert!(!cfg.default_options.query.reads_cache());
    }

    #[test]
    fn test_with_endpoint_keeps_network() {
        let cfg = ClientConfig::for_network(Network::Goerli).with_endpoint("http://127.0.0.1:8000");
        assert_eq!(cfg.network, Network::Goerli);
        assert_eq!(cfg.endpoint, "http://127.0.0.1:8000");
    }
}
