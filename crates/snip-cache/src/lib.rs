//! Lookup cache backends and the best-effort access layer the services use.

pub mod best_effort;
pub mod moka;
pub mod null;
pub mod redis;

pub use best_effort::{BestEffortCache, CachePolicy, DEFAULT_CACHE_TIMEOUT};
pub use moka::MokaUrlCache;
pub use null::NullCache;
pub use redis::RedisUrlCache;
pub use snip_core::cache::{Result, UrlCache, DEFAULT_TTL};
pub use snip_core::CacheError;
