use snip_core::StorageError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RedirectorError>;

/// The failure outcomes of a lookup.
///
/// A store outage is never reported as `NotFound`.
#[derive(Debug, Clone, Error)]
pub enum RedirectorError {
    #[error("short code not found: {0}")]
    NotFound(String),
    #[error("storage unavailable: {0}")]
    Unavailable(#[from] StorageError),
}
