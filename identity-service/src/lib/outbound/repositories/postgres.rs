use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use sqlx::Row;
use uuid::Uuid;

use crate::domain::user::errors::UserError;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::IdentityStore;

/// Unique constraint on `users.username` created by the initial migration
const USERNAME_CONSTRAINT: &str = "users_username_key";

/// PostgreSQL-backed identity store.
///
/// The `UNIQUE` constraint on `username` is the final word on duplicates;
/// each statement commits on its own, so `save` has nothing left to flush.
pub struct PostgresIdentityStore {
    pool: PgPool,
}

impl PostgresIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: PgRow) -> Result<User, UserError> {
    let column = |e: sqlx::Error| UserError::StoreUnavailable(e.to_string());

    Ok(User {
        id: UserId(row.try_get::<Uuid, _>("id").map_err(column)?),
        username: Username::new(row.try_get("username").map_err(column)?)?,
        email: EmailAddress::new(row.try_get("email").map_err(column)?)?,
        password_hash: row.try_get("password_hash").map_err(column)?,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(column)?,
    })
}

/// Map an insert failure, turning a hit on the username constraint into a conflict.
fn insert_error(e: sqlx::Error, username: &Username) -> UserError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() && db_err.constraint() == Some(USERNAME_CONSTRAINT) {
            return UserError::UsernameAlreadyExists(username.as_str().to_string());
        }
    }
    UserError::StoreUnavailable(e.to_string())
}

#[async_trait]
impl IdentityStore for PostgresIdentityStore {
    async fn get_all(&self) -> Result<Vec<User>, UserError> {
        let rows = sqlx::query(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| UserError::StoreUnavailable(e.to_string()))?;

        rows.into_iter().map(user_from_row).collect()
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError> {
        let row = sqlx::query(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserError::StoreUnavailable(e.to_string()))?;

        row.map(user_from_row).transpose()
    }

    async fn insert(&self, user: NewUser) -> Result<User, UserError> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, username, email, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user.username.as_str())
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| insert_error(e, &user.username))?;

        user_from_row(row)
    }

    async fn save(&self) -> Result<(), UserError> {
        Ok(())
    }
}
