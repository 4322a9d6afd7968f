use crate::AppState;
use crate::api::error::AppError;
use crate::services::identity::Identity;
use crate::utils::auth::validate_jwt;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

/// Verifies the caller's token and attaches the resolved [`Identity`] to the
/// request. This is the only place token signatures are checked.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Accept both `Bearer <jwt>` and a bare token
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(|h| h.strip_prefix("Bearer ").unwrap_or(h).trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Missing token".to_string()))?;

    let claims = validate_jwt(&token, &state.config).map_err(|e| {
        tracing::debug!("Token rejected: {}", e);
        AppError::Unauthorized("Invalid token".to_string())
    })?;

    req.extensions_mut().insert(Identity::from_claims(&claims));
    Ok(next.run(req).await)
}
