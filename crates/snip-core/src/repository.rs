use crate::error::StorageError;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// The persisted mapping from a short code to the URL it redirects to.
///
/// Mappings are created once and never updated or removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlMapping {
    /// Unique, immutable lookup key.
    pub short_code: ShortCode,
    /// The redirect target. Stored as given.
    pub long_url: String,
}

/// A read-only view of a repository.
///
/// This trait provides only the read operations from [`Repository`],
/// allowing services like the redirector to have read-only access.
#[async_trait]
pub trait ReadRepository: Send + Sync + 'static {
    /// Retrieves the long URL for a given short code.
    /// Returns `None` if the code does not exist.
    async fn get(&self, code: &ShortCode) -> Result<Option<String>>;

    /// Checks whether a short code already exists in the repository.
    async fn exists(&self, code: &ShortCode) -> Result<bool>;
}

#[async_trait]
pub trait Repository: ReadRepository {
    /// Inserts a new mapping atomically.
    ///
    /// Returns `Err(StorageError::Conflict)` if the code already exists; in
    /// that case nothing is written.
    async fn insert(&self, mapping: &UrlMapping) -> Result<()>;
}

#[async_trait]
impl<T: ReadRepository + ?Sized> ReadRepository for Arc<T> {
    async fn get(&self, code: &ShortCode) -> Result<Option<String>> {
        (**self).get(code).await
    }

    async fn exists(&self, code: &ShortCode) -> Result<bool> {
        (**self).exists(code).await
    }
}

#[async_trait]
impl<T: Repository + ?Sized> Repository for Arc<T> {
    async fn insert(&self, mapping: &UrlMapping) -> Result<()> {
        (**self).insert(mapping).await
    }
}
