//! Configuration for the retrieval service.

use serde::{Deserialize, Serialize};

use crate::{
    DEFAULT_CHUNK_OVERLAP, DEFAULT_EMBEDDING_DIMENSION, DEFAULT_MAX_CHUNK_SIZE,
    DEFAULT_MIN_CHUNK_SIZE,
};

/// Global retrieval service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Minimum chunk size in characters
    pub min_chunk_size: usize,

    /// Maximum chunk size in characters
    pub max_chunk_size: usize,

    /// Overlap between adjacent chunks in characters
    pub chunk_overlap: usize,

    /// Base URL of the embedding provider API
    pub embedding_base_url: String,

    /// Embedding model identifier
    pub embedding_model: String,

    /// Expected embedding vector dimension for the configured model
    pub embedding_dimension: usize,

    /// Process-wide fallback API key for internal/background embedding
    /// calls with no tenant; multi-tenant requests resolve per-tenant keys
    #[serde(skip_serializing)]
    pub default_api_key: Option<String>,

    /// Per-request timeout for provider calls, in seconds
    pub request_timeout_secs: u64,

    /// Default number of results returned by a search
    pub default_top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            min_chunk_size: DEFAULT_MIN_CHUNK_SIZE,
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            embedding_base_url: "https://api.openai.com/v1".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            embedding_dimension: DEFAULT_EMBEDDING_DIMENSION,
            default_api_key: None,
            request_timeout_secs: 30,
            default_top_k: 5,
        }
    }
}

impl RetrievalConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            min_chunk_size: std::env::var("MIN_CHUNK_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.min_chunk_size),
            max_chunk_size: std::env::var("MAX_CHUNK_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_chunk_size),
            chunk_overlap: std::env::var("CHUNK_OVERLAP")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.chunk_overlap),
            embedding_base_url: std::env::var("EMBEDDING_BASE_URL")
                .unwrap_or(defaults.embedding_base_url),
            embedding_model: std::env::var("EMBEDDING_MODEL").unwrap_or(defaults.embedding_model),
            embedding_dimension: std::env::var("EMBEDDING_DIMENSION")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.embedding_dimension),
            default_api_key: std::env::var("EMBEDDING_API_KEY").ok(),
            request_timeout_secs: std::env::var("EMBEDDING_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.request_timeout_secs),
            default_top_k: std::env::var("DEFAULT_TOP_K")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.default_top_k),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_chunking_bounds() {
        let config = RetrievalConfig::default();
        assert_eq!(config.min_chunk_size, 1200);
        assert_eq!(config.max_chunk_size, 1600);
        assert_eq!(config.chunk_overlap, 200);
        assert_eq!(config.embedding_dimension, 1536);
    }
}
