//! Service token verification for protected routes.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use clients::ServiceToken;

use crate::error::ApiError;
use crate::state::AppState;

/// Rejects requests without a valid `Authorization: Bearer` service token.
///
/// The verified claims are stored in the request extensions.
pub async fn require_service_token(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| {
            metrics::counter!("auth_rejections_total", "reason" => "missing").increment(1);
            ApiError::Unauthorized
        })?;

    let claims = ServiceToken::verify(token, &state.secret).map_err(|e| {
        metrics::counter!("auth_rejections_total", "reason" => "invalid").increment(1);
        tracing::warn!(error = %e, "rejected service token");
        ApiError::Unauthorized
    })?;
    tracing::debug!(subject = %claims.sub, "service token accepted");

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
