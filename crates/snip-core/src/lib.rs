//! Core types and traits for the snip URL shortener.
//!
//! This crate provides the types shared by the write path (shortener), the
//! read path (redirector), and the storage and cache backends they run on.

pub mod cache;
pub mod error;
pub mod repository;
pub mod shortcode;
pub mod shortener;

pub use cache::{UrlCache, DEFAULT_TTL};
pub use error::{CacheError, CoreError, ShortenerError, StorageError};
pub use repository::{ReadRepository, Repository, UrlMapping};
pub use shortcode::ShortCode;
pub use shortener::Shortener;
