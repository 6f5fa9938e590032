use async_trait::async_trait;

use crate::domain::user::errors::UserError;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::Username;

/// Port for user domain service operations.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Register a new account.
    ///
    /// # Arguments
    /// * `command` - Validated command containing username, email, and password
    ///
    /// # Returns
    /// Registered user entity
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `Password` - Password hashing failed
    /// * `StoreUnavailable` - Identity store operation failed
    async fn register(&self, command: RegisterUserCommand) -> Result<User, UserError>;

    /// Retrieve every registered user.
    ///
    /// # Errors
    /// * `StoreUnavailable` - Identity store operation failed
    async fn list_users(&self) -> Result<Vec<User>, UserError>;
}

/// Persistence collaborator holding user records.
///
/// Implementations must enforce username uniqueness themselves: `insert`
/// rejects a duplicate even when a caller's earlier lookup found none.
#[async_trait]
pub trait IdentityStore: Send + Sync + 'static {
    /// Retrieve all users, oldest first.
    ///
    /// # Errors
    /// * `StoreUnavailable` - Storage could not be read
    async fn get_all(&self) -> Result<Vec<User>, UserError>;

    /// Retrieve user by username.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `StoreUnavailable` - Storage could not be read
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError>;

    /// Add a new user, assigning its id and creation time.
    ///
    /// # Returns
    /// The stored user entity
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `StoreUnavailable` - Storage could not be written
    async fn insert(&self, user: NewUser) -> Result<User, UserError>;

    /// Commit inserted users to durable storage.
    ///
    /// # Errors
    /// * `StoreUnavailable` - Commit failed
    async fn save(&self) -> Result<(), UserError>;
}
