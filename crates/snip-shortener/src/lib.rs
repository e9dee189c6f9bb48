//! The write path: allocate a free short code, persist the mapping, and
//! prime the lookup cache.

pub mod allocator;
pub mod service;

pub use allocator::{CodeAllocator, DEFAULT_MAX_GENERATION_ATTEMPTS};
pub use service::{ShortenerConfig, ShortenerService, DEFAULT_MAX_INSERT_ATTEMPTS};
pub use snip_core::{Shortener, ShortenerError, UrlMapping};
