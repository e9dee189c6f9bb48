//! Mapping store backends.

pub mod memory;
pub mod mysql;
pub mod timeout;

pub use memory::InMemoryRepository;
pub use mysql::MySqlRepository;
pub use snip_core::repository::{ReadRepository, Repository, Result, UrlMapping};
pub use snip_core::StorageError;
pub use timeout::{TimeoutRepository, DEFAULT_STORE_TIMEOUT};
