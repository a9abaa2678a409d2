//! Error types for the todo store.
//!
//! # Design
//! `Validation` gets a dedicated variant because callers map it to a client
//! error, while every other variant means the store itself misbehaved.

use std::path::PathBuf;

use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors returned by [`TodoStore`](crate::store::TodoStore) operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A write would break a field constraint of the todo document.
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// A text query ran before the title text index was created.
    #[error("text index required for text search")]
    IndexMissing,

    /// The store was used after `close`.
    #[error("store is closed")]
    Closed,

    /// Reading or writing the snapshot file failed.
    #[error("snapshot I/O on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The snapshot file could not be encoded or decoded.
    #[error("snapshot format: {0}")]
    Snapshot(#[from] serde_json::Error),
}

impl StoreError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}
