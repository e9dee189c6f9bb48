//! The read path: resolve a short code through the lookup cache, falling
//! back to the mapping store on a miss.

pub mod error;
pub mod redirector;
pub mod service;

pub use error::{RedirectorError, Result};
pub use redirector::Redirector;
pub use service::RedirectorService;
