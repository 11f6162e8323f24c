//! Error handling for the collection server.

pub mod response;
pub mod types;

pub use types::{ApiError, ApiResult};
