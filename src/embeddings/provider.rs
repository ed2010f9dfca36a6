//! HTTP client for the external embedding provider.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{EmbeddingProvider, ProviderFactory};
use crate::error::RetrievalError;

/// Request payload for an embeddings call.
#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
    encoding_format: &'static str,
}

/// Response from the embedding provider.
#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

/// One vector in the provider response, in input order.
#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Authenticated client for an OpenAI-compatible embeddings endpoint.
pub struct HttpEmbeddingProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl HttpEmbeddingProvider {
    /// Create a provider client with a bounded request timeout.
    pub fn new(
        base_url: &str,
        api_key: &str,
        model: &str,
        timeout: Duration,
    ) -> Result<Self, RetrievalError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RetrievalError::Provider(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RetrievalError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbeddingRequest {
            model: &self.model,
            input: texts,
            encoding_format: "float",
        };
        let url = format!("{}/embeddings", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| RetrievalError::Provider(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RetrievalError::Provider(format!(
                "embedding endpoint returned {status}: {body}"
            )));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| RetrievalError::Provider(format!("malformed provider response: {e}")))?;

        debug!(
            model = %self.model,
            inputs = texts.len(),
            vectors = parsed.data.len(),
            "embedding request complete"
        );

        // one vector per input string, order-preserved by contract
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }
}

/// Builds [`HttpEmbeddingProvider`] clients for decrypted tenant keys.
#[derive(Debug, Clone)]
pub struct HttpProviderFactory {
    base_url: String,
    model: String,
    timeout: Duration,
}

impl HttpProviderFactory {
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.to_string(),
            model: model.to_string(),
            timeout,
        }
    }
}

impl ProviderFactory for HttpProviderFactory {
    fn build(&self, api_key: &str) -> Result<Arc<dyn EmbeddingProvider>, RetrievalError> {
        let provider =
            HttpEmbeddingProvider::new(&self.base_url, api_key, &self.model, self.timeout)?;
        Ok(Arc::new(provider))
    }
}
