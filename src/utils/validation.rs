use crate::api::error::AppError;
use axum::http::HeaderMap;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

/// First human-readable message out of a validation failure.
pub fn first_message(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| errors.to_string())
}

/// Parses a JSON body regardless of the declared content type (browser clients
/// post JSON as `text/plain`) and runs field validation.
pub fn parse_json_body<T>(body: &[u8]) -> Result<T, AppError>
where
    T: DeserializeOwned + Validate,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::BadRequest("Request body is required".to_string()));
    }

    let req: T = serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {}", e)))?;

    req.validate()
        .map_err(|e| AppError::BadRequest(first_message(&e)))?;

    Ok(req)
}

/// Header value as text, or `default` when absent or empty.
pub fn header_or(headers: &HeaderMap, name: &str, default: &str) -> String {
    headers
        .get(name)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}
