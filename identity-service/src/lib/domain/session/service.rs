use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use chrono::Duration;

use crate::domain::session::errors::SessionError;
use crate::domain::session::models::IssuedToken;
use crate::domain::session::models::LoginCommand;
use crate::domain::session::models::Principal;
use crate::domain::session::ports::SessionServicePort;
use crate::domain::user::ports::IdentityStore;

/// Domain service for login and token authentication.
pub struct SessionService<S>
where
    S: IdentityStore,
{
    store: Arc<S>,
    authenticator: Arc<Authenticator>,
    token_lifetime: Duration,
}

impl<S> SessionService<S>
where
    S: IdentityStore,
{
    /// Create a new session service.
    ///
    /// # Arguments
    /// * `store` - Identity store used to look up users
    /// * `authenticator` - Shared password verifier and token signer
    /// * `token_lifetime` - Validity of issued tokens
    pub fn new(store: Arc<S>, authenticator: Arc<Authenticator>, token_lifetime: Duration) -> Self {
        Self {
            store,
            authenticator,
            token_lifetime,
        }
    }
}

#[async_trait]
impl<S> SessionServicePort for SessionService<S>
where
    S: IdentityStore,
{
    async fn login(&self, command: LoginCommand) -> Result<IssuedToken, SessionError> {
        let user = self
            .store
            .find_by_username(&command.username)
            .await?
            .ok_or_else(|| SessionError::UnknownUser(command.username.to_string()))?;

        let claims = auth::Claims::for_user(
            user.id,
            user.username.as_str(),
            user.email.as_str(),
            self.token_lifetime,
        );

        let result = self
            .authenticator
            .authenticate(&command.password, &user.password_hash, &claims)
            .map_err(|e| match e {
                AuthenticationError::InvalidCredentials => {
                    SessionError::WrongPassword(user.username.to_string())
                }
                AuthenticationError::PasswordError(err) => SessionError::Internal(format!(
                    "Password verification failed for user {}: {}",
                    user.id, err
                )),
                AuthenticationError::JwtError(err) => SessionError::from(err),
            })?;

        tracing::info!(user_id = %user.id, username = %user.username, "Token issued");

        Ok(IssuedToken(result.access_token))
    }

    fn authenticate(&self, token: &str) -> Result<Principal, SessionError> {
        let claims = self.authenticator.validate_token(token)?;

        Principal::try_from(claims).map_err(|e| SessionError::InvalidToken(e.to_string()))
    }
}
