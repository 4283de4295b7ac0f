use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::AuthError;
use crate::error::ApiError;
use crate::state::AppState;

/// Verifies the bearer credential and injects the caller's `VerifiedIdentity`
/// into request extensions. Nothing downstream runs when verification fails.
pub async fn require_identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let credential = extract_bearer(request.headers()).map_err(|e| {
        tracing::debug!("Rejected request without usable credential: {}", e);
        ApiError::from(e)
    })?;

    let identity = state.verifier.verify(&credential).await.map_err(|e| {
        tracing::warn!("Credential verification failed: {}", e);
        ApiError::from(e)
    })?;

    tracing::debug!(uid = %identity.uid, "Authenticated request");
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

/// Extract the bearer credential from the Authorization header
pub fn extract_bearer(headers: &HeaderMap) -> Result<String, AuthError> {
    let header = headers.get(AUTHORIZATION).ok_or(AuthError::MissingCredential)?;

    let value = header.to_str().map_err(|_| {
        AuthError::InvalidCredential("Authorization header is not valid ASCII".to_string())
    })?;

    let (scheme, token) = value.trim().split_once(' ').unwrap_or((value.trim(), ""));
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidCredential(
            "Authorization header must use Bearer token format".to_string(),
        ));
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MissingCredential);
    }
    Ok(token.to_string())
}
