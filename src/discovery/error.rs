//! Error types for discovery operations

use thiserror::Error;

use super::config::ConfigError;
use crate::catalog::CatalogError;
use crate::store::StoreError;

/// Errors that can occur while discovering or refreshing derived metadata
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// Requested collection does not exist
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    /// Catalog source or metadata store failed
    #[error("Catalog error: {0}")]
    Source(String),

    /// Queryables store failed
    #[error("Queryables store error: {0}")]
    Store(#[from] StoreError),

    /// The requested refresh is switched off by configuration
    #[error("{0} is disabled")]
    Disabled(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for discovery operations
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

impl DiscoveryError {
    /// Whether this error means the collection vanished
    pub fn is_not_found(&self) -> bool {
        matches!(self, DiscoveryError::CollectionNotFound(_))
    }
}

impl From<CatalogError> for DiscoveryError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::CollectionNotFound(id) => DiscoveryError::CollectionNotFound(id),
            other => DiscoveryError::Source(other.to_string()),
        }
    }
}
