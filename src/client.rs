use std::sync::Arc;

use graphql_client::GraphQLQuery;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::cache::QueryCache;
use crate::config::ClientConfig;
use crate::document;
use crate::network::Network;
use crate::policy::{DefaultOptions, FetchPolicy};
use crate::query::{GraphQlError, GraphQlRequest};
use crate::transport::{HttpLink, Transport};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("GraphQL error: {}", join_errors(.0))]
    GraphQl(Vec<GraphQlError>),

    #[error("Response contained no data")]
    MissingData,

    #[error("No cached result for a cache-only query")]
    CacheMiss,
}

fn join_errors(errors: &[GraphQlError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

struct Inner {
    network: Network,
    link: Arc<dyn Transport>,
    cache: QueryCache,
    default_options: DefaultOptions,
}

/// Query client bound to one subgraph endpoint.
///
/// Cloning is cheap and every clone shares the same link, cache and options.
/// Build it once at startup and hand clones to whatever issues queries.
#[derive(Clone)]
pub struct SubgraphClient {
    inner: Arc<Inner>,
}

impl SubgraphClient {
    /// Composes an HTTP link, cache and default options. Performs no I/O.
    pub fn new(config: ClientConfig) -> Self {
        let link = HttpLink::new(config.endpoint.clone());
        Self::with_transport(config, Arc::new(link))
    }

    /// Builds the client for the network named in the environment
    pub fn from_env() -> Self {
        Self::new(ClientConfig::from_env())
    }

    pub fn with_transport(config: ClientConfig, link: Arc<dyn Transport>) -> Self {
        tracing::debug!(
            network = %config.network,
            endpoint = link.endpoint(),
            add_typename = config.cache.add_typename,
            fetch_policy = %config.default_options.query,
            "building subgraph client"
        );
        Self {
            inner: Arc::new(Inner {
                network: config.network,
                link,
                cache: QueryCache::new(config.cache),
                default_options: config.default_options,
            }),
        }
    }

    pub fn endpoint(&self) -> &str {
        self.inner.link.endpoint()
    }

    pub fn network(&self) -> Network {
        self.inner.network
    }

    pub fn default_options(&self) -> DefaultOptions {
        self.inner.default_options
    }

    pub fn cache(&self) -> &QueryCache {
        &self.inner.cache
    }

    /// True when both handles refer to the same client
    pub fn ptr_eq(&self, other: &SubgraphClient) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Runs a query with the client's default fetch policy
    pub async fn query(&self, request: GraphQlRequest) -> Result<Value, ClientError> {
        self.query_with_policy(request, self.inner.default_options.query)
            .await
    }

    pub async fn query_with_policy(
        &self,
        request: GraphQlRequest,
        policy: FetchPolicy,
    ) -> Result<Value, ClientError> {
        let query =
            document::prepare(&request.query, self.inner.cache.config().add_typename).into_owned();
        let request = GraphQlRequest { query, ..request };

        if policy.reads_cache() {
            if let Some(data) = self.inner.cache.get(&request).await {
                tracing::debug!(%policy, "serving query from cache");
                return Ok(data);
            }
            if !policy.uses_network() {
                return Err(ClientError::CacheMiss);
            }
        }

        let response = self.inner.link.execute(&request).await?;
        if !response.errors.is_empty() {
            tracing::warn!(
                endpoint = self.endpoint(),
                errors = response.errors.len(),
                "subgraph returned GraphQL errors"
            );
            return Err(ClientError::GraphQl(response.errors));
        }
        let data = response.data.ok_or(ClientError::MissingData)?;

        if policy.writes_cache() {
            self.inner.cache.set(&request, data.clone()).await;
        }
        Ok(data)
    }

    /// Runs a query and deserializes its `data` into `T`
    pub async fn query_as<T: DeserializeOwned>(
        &self,
        request: GraphQlRequest,
    ) -> Result<T, ClientError> {
        let data = self.query(request).await?;
        Ok(serde_json::from_value(data)?)
    }

    /// Runs a `graphql_client` generated operation
    pub async fn query_typed<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, ClientError> {
        let request = GraphQlRequest::from_query_body(Q::build_query(variables))?;
        self.query_as::<Q::ResponseData>(request).await
    }
}
