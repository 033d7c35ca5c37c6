//! Persistence adapter.
//!
//! The editor keeps one diagram per storage key and only ever saves or
//! loads it whole. Backends encode the document as JSON so a memory round
//! trip sees exactly what a file round trip would.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::document::DiagramDocument;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Nothing has been saved under the key. The editor treats this as an
    /// absent diagram rather than a failure.
    #[error("No diagram stored under {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Key-value store for diagram documents.
pub trait Storage: Send + Sync {
    /// Save a document under a key, replacing any previous value.
    fn save(&self, key: &str, document: &DiagramDocument) -> BoxFuture<'_, StorageResult<()>>;

    /// Load the document stored under a key.
    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<DiagramDocument>>;
}

fn encode(document: &DiagramDocument) -> StorageResult<String> {
    document
        .to_json()
        .map_err(|e| StorageError::Serialization(e.to_string()))
}

fn decode(key: &str, json: &str) -> StorageResult<DiagramDocument> {
    DiagramDocument::from_json(json)
        .map_err(|e| StorageError::Serialization(format!("Diagram {} is corrupt: {}", key, e)))
}
