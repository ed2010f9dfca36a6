//! Core types for the retrieval engine.

mod chunk;
mod config;
mod document;
mod request;

pub use chunk::{Chunk, RetrievedChunk};
pub use config::RetrievalConfig;
pub use document::{Document, DocumentStatus};
pub use request::{
    IngestDocumentRequest, IngestDocumentResponse, SearchRequest, SearchResponse,
};
