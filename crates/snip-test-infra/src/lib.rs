//! Test fixtures shared across the snip crates: disposable MySQL and Redis
//! containers, plus instrumented store, cache, and generator doubles.

pub mod doubles;
pub mod error;
pub mod mysql;
pub mod redis;

pub use error::{Result, TestInfraError};
