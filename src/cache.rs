use moka::future::Cache as MemCache;
use serde_json::Value;

use crate::query::GraphQlRequest;

const DEFAULT_MAX_ENTRIES: u64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Tag outgoing selection sets with `__typename`
    pub add_typename: bool,
    /// Upper bound on stored results
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            add_typename: false,
            max_capacity: DEFAULT_MAX_ENTRIES,
        }
    }
}

/// In-memory store of query results keyed by operation
pub struct QueryCache {
    mem: MemCache<String, Value>,
    config: CacheConfig,
}

impl QueryCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            mem: MemCache::builder().max_capacity(config.max_capacity).build(),
            config,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Hash of the document, operation name and variables.
    ///
    /// Variables are hashed with object keys sorted, so their order does not matter.
    pub fn key_for(request: &GraphQlRequest) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(request.query.as_bytes());
        hasher.update(&[0]);
        if let Some(name) = &request.operation_name {
            hasher.update(name.as_bytes());
        }
        hasher.update(&[0]);
        if let Some(vars) = &request.variables {
            hash_canonical(&mut hasher, vars);
        }
        hasher.finalize().to_hex().to_string()
    }

    pub async fn get(&self, request: &GraphQlRequest) -> Option<Value> {
        self.mem.get(&Self::key_for(request)).await
    }

    pub async fn set(&self, request: &GraphQlRequest, data: Value) {
        self.mem.insert(Self::key_for(request), data).await;
    }

    pub async fn evict(&self, request: &GraphQlRequest) {
        self.mem.invalidate(&Self::key_for(request)).await;
    }

    pub fn clear(&self) {
        self.mem.invalidate_all();
    }

    /// Number of stored results, after pending maintenance has run
    pub async fn entry_count(&self) -> u64 {
        self.mem.run_pending_tasks().await;
        self.mem.entry_count()
    }
}

fn hash_canonical(hasher: &mut blake3::Hasher, value: &Value) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            hasher.update(b"{");
            for key in keys {
                hasher.update(Value::String(key.clone()).to_string().as_bytes());
                hasher.update(b":");
                hash_canonical(hasher, &map[key.as_str()]);
                hasher.update(b",");
            }
            hasher.update(b"}");
        }
        Value::Array(items) => {
            hasher.update(b"[");
            for item in items {
                hash_canonical(hasher, item);
                hasher.update(b",");
            }
            hasher.update(b"]");
        }
        scalar => {
            hasher.update(scalar.to_string().as_bytes());
        }
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
