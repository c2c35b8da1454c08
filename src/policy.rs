use std::fmt;
use std::str::FromStr;

use crate::config::ConfigError;

/// Decides whether a query may be answered from the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPolicy {
    /// Serve from cache on a hit, otherwise fetch and store
    CacheFirst,
    /// Always fetch, still store the fresh result
    NetworkOnly,
    /// Always fetch, never touch the cache
    NoCache,
    /// Never fetch; a miss is an error
    CacheOnly,
}

impl FetchPolicy {
    pub fn reads_cache(&self) -> bool {
        matches!(self, FetchPolicy::CacheFirst | FetchPolicy::CacheOnly)
    }

    pub fn writes_cache(&self) -> bool {
        matches!(self, FetchPolicy::CacheFirst | FetchPolicy::NetworkOnly)
    }

    pub fn uses_network(&self) -> bool {
        !matches!(self, FetchPolicy::CacheOnly)
    }
}

impl FromStr for FetchPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cache-first" => Ok(FetchPolicy::CacheFirst),
            "network-only" => Ok(FetchPolicy::NetworkOnly),
            "no-cache" => Ok(FetchPolicy::NoCache),
            "cache-only" => Ok(FetchPolicy::CacheOnly),
            _ => Err(ConfigError::UnknownFetchPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for FetchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FetchPolicy::CacheFirst => "cache-first",
            FetchPolicy::NetworkOnly => "network-only",
            FetchPolicy::NoCache => "no-cache",
            FetchPolicy::CacheOnly => "cache-only",
        };
        f.write_str(s)
    }
}

/// Policies applied to operations issued without a per-call override
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultOptions {
    pub query: FetchPolicy,
}

impl Default for DefaultOptions {
    fn default() -> Self {
        // reads always bypass the cache, results are still stored
        Self {
            query: FetchPolicy::NetworkOnly,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_query_policy_bypasses_reads() {
        let opts = DefaultOptions::default();
        assert_eq!(opts.query, FetchPolicy::NetworkOnly);
        assert!(!opts.query.reads_cache());
        assert!(opts.query.writes_cache());
        assert!(opts.query.uses_network());
    }

    #[test]
    fn test_policy_table() {
        assert!(FetchPolicy::CacheFirst.reads_cache());
        assert!(FetchPolicy::CacheFirst.writes_cache());
        assert!(!FetchPolicy::NoCache.reads_cache());
        assert!(!FetchPolicy::NoCache.writes_cache());
        assert!(FetchPolicy::CacheOnly.reads_cache());
        assert!(!FetchPolicy::CacheOnly.uses_network());
    }

    #[test]
    fn test_parse_and_display() {
        for policy in [
            FetchPolicy::CacheFirst,
            FetchPolicy::NetworkOnly,
            FetchPolicy::NoCache,
            FetchPolicy::CacheOnly,
        ] {
            assert_eq!(policy.to_string().parse::<FetchPolicy>().unwrap(), policy);
        }
        assert!(matches!(
            "cache-and-network".parse::<FetchPolicy>(),
            Err(ConfigError::UnknownFetchPolicy(_))
        ));
    }
}
