mod error;
mod health;
mod url;

pub use error::ErrorResponse;
pub use health::HealthResponse;
pub use url::{ShortenRequest, ShortenResponse};
