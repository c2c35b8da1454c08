pub mod cache;
pub mod client;
pub mod config;
pub mod document;
pub mod network;
pub mod policy;
pub mod query;
pub mod transport;

/// Environment variable holding the selected network id
pub const NETWORK_ENV_VAR: &str = "DEFAULT_NETWORK";

pub const MAINNET_SUBGRAPH_URL: &str = "https://api.thegraph.com/subgraphs/name/ensdomains/ens";
pub const GOERLI_SUBGRAPH_URL: &str =
    "https://api.thegraph.com/subgraphs/name/ensdomains/ensgoerli";
