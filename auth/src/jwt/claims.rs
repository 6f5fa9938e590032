use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Credential claims carried inside an access token.
///
/// Holds the identity facts of the user the token was issued to,
/// plus the registered timestamps used during validation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject identifier (the user's id)
    pub sid: String,

    /// Username
    pub name: String,

    /// Email address
    pub email: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issuer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Audience
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

impl Claims {
    /// Create claims for an authenticated user.
    ///
    /// # Arguments
    /// * `subject_id` - Unique user identifier
    /// * `username` - Username
    /// * `email` - Email address
    /// * `expires_in` - Lifetime of the token from now
    ///
    /// # Returns
    /// Claims with sid, name, email, iat and exp set
    pub fn for_user(
        subject_id: impl ToString,
        username: impl Into<String>,
        email: impl Into<String>,
        expires_in: Duration,
    ) -> Self {
        let now = Utc::now();

        Self {
            sid: subject_id.to_string(),
            name: username.into(),
            email: email.into(),
            iat: now.timestamp(),
            exp: now
                .checked_add_signed(expires_in)
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
                .timestamp(),
            iss: None,
            aud: None,
        }
    }

    /// Set expiration (Unix timestamp).
    pub fn with_expiration(mut self, exp: i64) -> Self {
        self.exp = exp;
        self
    }

    /// Set issuer.
    pub fn with_issuer(mut self, iss: impl Into<String>) -> Self {
        self.iss = Some(iss.into());
        self
    }

    /// Set audience.
    pub fn with_audience(mut self, aud: impl Into<String>) -> Self {
        self.aud = Some(aud.into());
        self
    }
}
