use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::INVALID_CREDENTIALS;
use crate::domain::session::models::LoginCommand;
use crate::domain::session::ports::SessionServicePort;
use crate::domain::user::models::Username;
use crate::domain::user::ports::IdentityStore;
use crate::inbound::http::router::AppState;

pub async fn login<S: IdentityStore>(
    State(state): State<AppState<S>>,
    Json(body): Json<LoginRequest>,
) -> Result<ApiSuccess<String>, ApiError> {
    // A name that could never have been registered cannot match a user
    let username = Username::new(body.username).map_err(|e| {
        tracing::warn!(reason = %e, "Login rejected, malformed username");
        ApiError::BadRequest(INVALID_CREDENTIALS.to_string())
    })?;

    let token = state
        .session_service
        .login(LoginCommand::new(username, body.password))
        .await
        .map_err(|e| {
            tracing::warn!(reason = %e, "Login rejected");
            ApiError::from(e)
        })?;

    Ok(ApiSuccess::new(StatusCode::OK, token.0))
}

/// HTTP request body for logging in (raw JSON)
///
/// Any `email` field sent alongside is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    username: String,
    password: String,
}
