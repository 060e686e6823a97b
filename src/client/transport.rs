//! HTTP transport for GraphQL requests.
//!
//! A [`Transport`] performs exactly one POST per call and hands back the raw
//! body. It does not interpret status codes: GraphQL reports failures inside
//! the body, so decoding is left to the caller.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ProviderConfig;
use crate::error::ProviderError;

/// A GraphQL request body: `{"query": ..., "variables": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphqlRequest {
    /// The query or mutation document.
    pub query: &'static str,
    /// Variables referenced by the document.
    pub variables: serde_json::Value,
}

impl GraphqlRequest {
    /// Create a request from a document and its variables.
    pub fn new(query: &'static str, variables: serde_json::Value) -> Self {
        Self { query, variables }
    }
}

/// A failed POST, rendered as `Post "<url>": <cause>`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Post \"{url}\": {message}")]
pub struct TransportError {
    url: String,
    message: String,
}

impl TransportError {
    /// Create a transport error for a request to `url`.
    pub fn new(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            message: message.into(),
        }
    }

    /// The endpoint the request was sent to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The underlying cause.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Sends GraphQL requests to the API.
#[async_trait::async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Build a transport from provider configuration.
    fn from_config(config: &ProviderConfig) -> Result<Self, ProviderError>
    where
        Self: Sized;

    /// The endpoint requests are posted to.
    fn url(&self) -> &str;

    /// POST the request once and return the response body.
    async fn execute(&self, request: &GraphqlRequest) -> Result<Vec<u8>, TransportError>;
}

/// [`Transport`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    url: String,
    api_token: String,
}

impl HttpTransport {
    /// Create a transport posting to `url` and authenticating with `api_token`.
    pub fn new(url: impl Into<String>, api_token: impl Into<String>) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| ProviderError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            url: url.into(),
            api_token: api_token.into(),
        })
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    fn from_config(config: &ProviderConfig) -> Result<Self, ProviderError> {
        Self::new(config.endpoint()?, config.api_token.clone())
    }

    fn url(&self) -> &str {
        &self.url
    }

    async fn execute(&self, request: &GraphqlRequest) -> Result<Vec<u8>, TransportError> {
        debug!(url = %self.url, "POST graphql request");

        let response = self
            .http
            .post(&self.url)
            .header("X-API-KEY", &self.api_token)
            .json(request)
            .send()
            .await
            .map_err(|e| TransportError::new(&self.url, e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %self.url, status = %status, "GraphQL endpoint returned non-success status");
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::new(&self.url, e.without_url().to_string()))?;

        Ok(body.to_vec())
    }
}
