use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::errors::JwtError;

/// Token validation settings beyond signature and expiration.
///
/// Expiration is always validated. Issuer and audience are only stamped
/// on issued tokens and required on presented tokens when configured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationPolicy {
    /// Clock skew tolerance in seconds applied to `exp`
    pub leeway_seconds: u64,
    pub issuer: Option<String>,
    pub audience: Option<String>,
}

/// JWT token handler for encoding and decoding credential tokens.
///
/// Uses HS512 (HMAC with SHA-512). The signing key is fixed at construction
/// and never changes, so a single handler can be shared across threads.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    policy: ValidationPolicy,
}

impl JwtHandler {
    /// Create a new JWT handler with a secret key and the default policy.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    ///
    /// # Returns
    /// JwtHandler instance configured with HS512 algorithm
    ///
    /// # Security Notes
    /// - The secret should be at least 512 bits (64 bytes) for HS512
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &[u8]) -> Self {
        Self::with_policy(secret, ValidationPolicy::default())
    }

    /// Create a new JWT handler with an explicit validation policy.
    pub fn with_policy(secret: &[u8], policy: ValidationPolicy) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS512,
            policy,
        }
    }

    /// Encode claims into a signed JWT token.
    ///
    /// Configured issuer and audience are stamped onto the claims
    /// unless the caller already set them.
    ///
    /// # Arguments
    /// * `claims` - Claims to encode
    ///
    /// # Returns
    /// JWT token string
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn encode(&self, claims: &Claims) -> Result<String, JwtError> {
        let mut claims = claims.clone();
        if claims.iss.is_none() {
            claims.iss = self.policy.issuer.clone();
        }
        if claims.aud.is_none() {
            claims.aud = self.policy.audience.clone();
        }

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Decode and validate a JWT token.
    ///
    /// # Arguments
    /// * `token` - JWT token string to decode
    ///
    /// # Returns
    /// Decoded claims
    ///
    /// # Errors
    /// * `TokenExpired` - The `exp` claim lies in the past
    /// * `InvalidToken` - Signature, structure, algorithm, issuer or audience check failed
    pub fn decode(&self, token: &str) -> Result<Claims, JwtError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation())
            .map(|token_data| token_data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                _ => JwtError::InvalidToken(e.to_string()),
            })
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = self.policy.leeway_seconds;
        validation.validate_exp = true;

        let mut required = vec!["exp"];

        if let Some(issuer) = &self.policy.issuer {
            validation.set_issuer(&[issuer]);
            required.push("iss");
        }

        match &self.policy.audience {
            Some(audience) => {
                validation.set_audience(&[audience]);
                required.push("aud");
            }
            None => validation.validate_aud = false,
        }

        validation.set_required_spec_claims(&required);
        validation
    }
}
