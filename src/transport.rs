use async_trait::async_trait;
use reqwest::Client;

use crate::client::ClientError;
use crate::query::{GraphQlRequest, GraphQlResponse};

/// Sends a prepared operation to a GraphQL endpoint
#[async_trait]
pub trait Transport: Send + Sync {
    fn endpoint(&self) -> &str;

    async fn execute(&self, request: &GraphQlRequest) -> Result<GraphQlResponse, ClientError>;
}

/// Plain HTTP POST link: no extra headers, no auth, no retries
#[derive(Clone)]
pub struct HttpLink {
    endpoint: String,
    http_client: Client,
}

impl HttpLink {
    /// Nothing is sent until the first query
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(endpoint, Client::new())
    }

    pub fn with_client(endpoint: impl Into<String>, http_client: Client) -> Self {
        Self {
            endpoint: endpoint.into(),
            http_client,
        }
    }
}

#[async_trait]
impl Transport for HttpLink {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn execute(&self, request: &GraphQlRequest) -> Result<GraphQlResponse, ClientError> {
        tracing::debug!(
            endpoint = %self.endpoint,
            operation = request.operation_name.as_deref().unwrap_or("<anonymous>"),
            "sending GraphQL request"
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            // servers commonly report validation failures as 400 with a GraphQL body
            if let Ok(parsed) = serde_json::from_slice::<GraphQlResponse>(&body) {
                if !parsed.errors.is_empty() {
                    return Ok(parsed);
                }
            }
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        Ok(serde_json::from_slice(&body)?)
    }
}
