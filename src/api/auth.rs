//! Bearer credential authentication
//!
//! Every denial uses the same status and message: a caller can never
//! distinguish a never-issued secret from an expired or revoked one,
//! nor from a storage outage (which denies rather than fails open).

use axum::http::{header, HeaderMap};
use tracing::{debug, error};

use crate::api::error::ApiError;
use crate::domain::api_key::{ApiKey, ApiKeyRepository};
use crate::infrastructure::api_key::ApiKeyService;

const GENERIC_UNAUTHORIZED: &str = "invalid credential";

/// Pull the bearer credential out of the request headers.
///
/// Only `Authorization: Bearer <secret>` is accepted; any other shape
/// yields the generic denial.
pub fn extract_bearer_credential(headers: &HeaderMap) -> Result<String, ApiError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthorized(GENERIC_UNAUTHORIZED))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::unauthorized(GENERIC_UNAUTHORIZED))?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::unauthorized(GENERIC_UNAUTHORIZED))?;

    Ok(token.trim().to_string())
}

/// Authenticate a request against the key service.
pub async fn authenticate<R: ApiKeyRepository + 'static>(
    service: &ApiKeyService<R>,
    headers: &HeaderMap,
) -> Result<ApiKey, ApiError> {
    let secret = extract_bearer_credential(headers)?;

    debug!(
        key_prefix = %secret.chars().take(11).collect::<String>(),
        "validating credential"
    );

    match service.validate(&secret).await {
        Ok(Some(api_key)) => Ok(api_key),
        Ok(None) => Err(ApiError::unauthorized(GENERIC_UNAUTHORIZED)),
        Err(e) => {
            // Fail closed, but keep the denial indistinguishable
            error!(%e, "credential validation failed");
            Err(ApiError::unauthorized(GENERIC_UNAUTHORIZED))
        }
    }
}
