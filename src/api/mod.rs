use crate::api::query::GraphQlRequest;
use crate::api::types::GraphQlResponse;
use crate::config::ApiConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use log::{debug, error};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

pub mod pair_day_datas;
pub mod pairs;
pub mod query;
pub mod types;

pub use pair_day_datas::PairDayQuery;
pub use pairs::PairQuery;

/// Delivers one GraphQL request and returns the raw JSON body.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubgraphTransport: Send + Sync {
    async fn execute(&self, request: GraphQlRequest) -> Result<Value>;
}

/// POSTs queries to the subgraph over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::ConfigError(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SubgraphTransport for HttpTransport {
    async fn execute(&self, request: GraphQlRequest) -> Result<Value> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::NetworkError(format!("{} request failed: {}", request.operation_name, e)))?;

        let status = response.status();
        if !status.is_success() {
            let error = match status {
                StatusCode::TOO_MANY_REQUESTS => {
                    Error::ApiError("Subgraph rate limit exceeded".to_string())
                }
                StatusCode::SERVICE_UNAVAILABLE => {
                    Error::ApiError("Subgraph is unavailable".to_string())
                }
                _ => Error::ApiError(format!("Subgraph request failed with status: {}", status)),
            };
            error!("{} query rejected: {}", request.operation_name, error);
            return Err(error);
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::NetworkError(format!("Failed to read response body: {}", e)))?;
        serde_json::from_slice(&body)
            .map_err(|e| Error::ApiInvalidFormat(format!("Response is not JSON: {}", e)))
    }
}

/// Sends queries through a transport and unwraps the GraphQL envelope.
#[derive(Clone)]
pub struct SubgraphClient {
    transport: Arc<dyn SubgraphTransport>,
}

impl SubgraphClient {
    pub fn new(transport: Arc<dyn SubgraphTransport>) -> Self {
        Self { transport }
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Ok(Self::new(Arc::new(HttpTransport::new(config)?)))
    }

    pub async fn query<T: DeserializeOwned>(&self, request: GraphQlRequest) -> Result<T> {
        let operation = request.operation_name;
        debug!("Sending {} query with variables {}", operation, request.variables);

        let body = self.transport.execute(request).await?;
        let envelope: GraphQlResponse<T> = serde_json::from_value(body).map_err(|e| {
            error!("Failed to parse {} response: {}", operation, e);
            Error::ApiInvalidFormat(format!("Unexpected {} response shape: {}", operation, e))
        })?;

        if let Some(errors) = envelope.errors.filter(|errors| !errors.is_empty()) {
            let messages = errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            error!("{} query returned errors: {}", operation, messages);
            return Err(Error::ApiError(messages));
        }

        envelope
            .data
            .ok_or_else(|| Error::ApiInvalidFormat(format!("{} response has no data", operation)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::PairsData;
    use crate::dashboard::params::{OrderDirection, PairOrderBy};
    use serde_json::json;

    fn request() -> GraphQlRequest {
        query::pairs_request(5, PairOrderBy::CreatedAtTimestamp, OrderDirection::Desc, 0, None)
    }

    fn client_returning(body: Result<Value>) -> SubgraphClient {
        let mut transport = MockSubgraphTransport::new();
        let mut body = Some(body);
        transport
            .expect_execute()
            .times(1)
            .returning(move |_| body.take().unwrap_or_else(|| Ok(Value::Null)));
        SubgraphClient::new(Arc::new(transport))
    }

    #[tokio::test]
    async fn test_query_unwraps_data() {
        let client = client_returning(Ok(json!({ "data": { "pairs": [] } })));
        let data: PairsData = client.query(request()).await.unwrap();
        assert!(data.pairs.is_empty());
    }

    #[tokio::test]
    async fn test_graphql_errors_become_api_error() {
        let client = client_returning(Ok(json!({
            "data": null,
            "errors": [{ "message": "Type `Query` has no field `pairz`" }]
        })));
        let result: Result<PairsData> = client.query(request()).await;
        assert!(matches!(result, Err(Error::ApiError(msg)) if msg.contains("pairz")));
    }

    #[tokio::test]
    async fn test_missing_data_is_invalid_format() {
        let client = client_returning(Ok(json!({})));
        let result: Result<PairsData> = client.query(request()).await;
        assert!(matches!(result, Err(Error::ApiInvalidFormat(_))));
    }

    #[tokio::test]
    async fn test_wrong_shape_is_invalid_format() {
        let client = client_returning(Ok(json!({ "data": { "pairs": "nope" } })));
        let result: Result<PairsData> = client.query(request()).await;
        assert!(matches!(result, Err(Error::ApiInvalidFormat(_))));
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let client = client_returning(Err(Error::NetworkError("connection refused".into())));
        let result: Result<PairsData> = client.query(request()).await;
        assert!(matches!(result, Err(Error::NetworkError(_))));
    }
}
