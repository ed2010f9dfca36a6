//! HTTP surface for the retrieval engine.

pub mod handlers;

pub use handlers::AppState;
