use async_trait::async_trait;

use crate::domain::session::errors::SessionError;
use crate::domain::session::models::IssuedToken;
use crate::domain::session::models::LoginCommand;
use crate::domain::session::models::Principal;

/// Port for credential verification and token-based identity recovery.
#[async_trait]
pub trait SessionServicePort: Send + Sync + 'static {
    /// Verify credentials and issue an access token.
    ///
    /// # Arguments
    /// * `command` - Username and plaintext password
    ///
    /// # Returns
    /// Signed token scoped to the matching user
    ///
    /// # Errors
    /// * `UnknownUser` - No user with this username
    /// * `WrongPassword` - Password does not match the stored hash
    /// * `StoreUnavailable` - Identity store operation failed
    /// * `Internal` - Hash verification or token signing failed
    async fn login(&self, command: LoginCommand) -> Result<IssuedToken, SessionError>;

    /// Recover the caller's identity from a presented token.
    ///
    /// # Errors
    /// * `ExpiredToken` - Token lifetime has passed
    /// * `InvalidToken` - Signature, structure or claims are not acceptable
    fn authenticate(&self, token: &str) -> Result<Principal, SessionError>;
}
