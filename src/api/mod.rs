//! API layer - HTTP-facing authentication and error mapping

pub mod auth;
pub mod error;

pub use auth::{authenticate, extract_bearer_credential};
pub use error::{ApiError, ApiErrorResponse, ApiErrorType};
