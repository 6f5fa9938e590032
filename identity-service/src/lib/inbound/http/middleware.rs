use axum::extract::Request;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

use crate::domain::session::ports::SessionServicePort;
use crate::domain::user::ports::IdentityStore;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::UNAUTHORIZED;
use crate::inbound::http::router::AppState;

/// Middleware that validates bearer tokens and attaches the caller's
/// `Principal` to request extensions.
///
/// Every rejection produces the same 401 body; the reason is only logged.
pub async fn authenticate<S: IdentityStore>(
    State(state): State<AppState<S>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token_from_header(&req)?;

    let principal = state.session_service.authenticate(token).map_err(|e| {
        tracing::warn!(reason = %e, "Token rejected");
        ApiError::from(e)
    })?;

    tracing::debug!(user_id = %principal.subject_id, "Request authenticated");
    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}

fn extract_token_from_header(req: &Request) -> Result<&str, ApiError> {
    let unauthorized = |reason: &str| {
        tracing::warn!(reason, "Token rejected");
        ApiError::Unauthorized(UNAUTHORIZED.to_string())
    };

    let auth_header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| unauthorized("missing Authorization header"))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| unauthorized("Authorization header is not visible ASCII"))?;

    // Scheme names are case-insensitive
    auth_str
        .split_once(' ')
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("Bearer"))
        .map(|(_, token)| token.trim())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| unauthorized("expected Bearer <token>"))
}
