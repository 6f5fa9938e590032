use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;

/// Resolved identity of an authenticated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub subject_id: UserId,
    pub username: String,
    pub email: String,
}

impl TryFrom<auth::Claims> for Principal {
    type Error = crate::domain::user::errors::UserIdError;

    fn try_from(claims: auth::Claims) -> Result<Self, Self::Error> {
        Ok(Self {
            subject_id: UserId::from_string(&claims.sid)?,
            username: claims.name,
            email: claims.email,
        })
    }
}

/// Signed access token handed out on a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken(pub String);

impl IssuedToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Command to log in with a username and plaintext password
#[derive(Debug)]
pub struct LoginCommand {
    pub username: Username,
    pub password: String,
}

impl LoginCommand {
    pub fn new(username: Username, password: String) -> Self {
        Self { username, password }
    }
}
