use thiserror::Error;

use crate::domain::user::errors::UserError;

/// Error for login and token authentication.
///
/// `UnknownUser` and `WrongPassword` stay distinct here for logging; the
/// HTTP layer reports both as the same invalid-credentials response.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    #[error("User does not exist: {0}")]
    UnknownUser(String),

    #[error("Wrong password for user: {0}")]
    WrongPassword(String),

    #[error("Token is expired")]
    ExpiredToken,

    #[error("Token is invalid: {0}")]
    InvalidToken(String),

    #[error("Identity store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Credential processing failed: {0}")]
    Internal(String),
}

impl From<UserError> for SessionError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::StoreUnavailable(msg) => SessionError::StoreUnavailable(msg),
            other => SessionError::Internal(other.to_string()),
        }
    }
}

impl From<auth::JwtError> for SessionError {
    fn from(err: auth::JwtError) -> Self {
        match err {
            auth::JwtError::TokenExpired => SessionError::ExpiredToken,
            auth::JwtError::InvalidToken(msg) => SessionError::InvalidToken(msg),
            auth::JwtError::EncodingFailed(msg) => SessionError::Internal(msg),
        }
    }
}
