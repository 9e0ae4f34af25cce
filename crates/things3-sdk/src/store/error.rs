//! # Store Error Types

use std::path::PathBuf;

use thiserror::Error;

use crate::dates::DateError;

/// Store operation result type
pub type StoreResult<T> = Result<T, StoreError>;

/// Failures reading the Things database.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Things database not found: {0}")]
    DatabaseNotFound(String),

    #[error("Failed to open Things database at {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: sqlx::Error,
    },

    #[error("Database query failed: {0}")]
    Query(#[from] sqlx::Error),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error(transparent)]
    Date(#[from] DateError),
}

impl StoreError {
    pub fn invalid_filter(message: impl Into<String>) -> Self {
        Self::InvalidFilter(message.into())
    }

    /// True when Things itself is missing rather than a single query failing.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::DatabaseNotFound(_) | StoreError::Open { .. })
    }
}
