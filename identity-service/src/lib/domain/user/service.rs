use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;

use crate::domain::user::errors::UserError;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::ports::IdentityStore;
use crate::domain::user::ports::UserServicePort;

/// Domain service implementation for account registration and listing.
pub struct UserService<S>
where
    S: IdentityStore,
{
    store: Arc<S>,
    authenticator: Arc<Authenticator>,
}

impl<S> UserService<S>
where
    S: IdentityStore,
{
    /// Create a new user service.
    ///
    /// # Arguments
    /// * `store` - Identity store that owns registered users
    /// * `authenticator` - Shared authenticator used to hash passwords
    pub fn new(store: Arc<S>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            store,
            authenticator,
        }
    }
}

#[async_trait]
impl<S> UserServicePort for UserService<S>
where
    S: IdentityStore,
{
    async fn register(&self, command: RegisterUserCommand) -> Result<User, UserError> {
        if self
            .store
            .find_by_username(&command.username)
            .await?
            .is_some()
        {
            tracing::info!(username = %command.username, "Registration rejected, username taken");
            return Err(UserError::UsernameAlreadyExists(
                command.username.to_string(),
            ));
        }

        let password_hash = self.authenticator.hash_password(&command.password)?;

        let new_user = NewUser {
            username: command.username,
            email: command.email,
            password_hash,
        };

        // The store re-checks uniqueness; a concurrent registration that
        // slipped past the lookup above fails here.
        let user = self.store.insert(new_user).await?;
        self.store.save().await?;

        tracing::info!(user_id = %user.id, username = %user.username, "User registered");

        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, UserError> {
        self.store.get_all().await
    }
}
