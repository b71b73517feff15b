//! Access-token verification.
//!
//! Tokens are minted by the hosted identity platform and signed with HS256
//! using a secret shared with this server. We never issue tokens, so there
//! is no encoding side here.

use homestead_core::roles::{ROLE_CUSTOMER, VALID_ROLES};
use homestead_core::types::UserId;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Claims read from an access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Platform user id. Also the primary key of `profiles`.
    pub sub: UserId,
    /// Platform role. Tokens minted before roles existed carry none.
    #[serde(default = "default_role")]
    pub role: String,
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

fn default_role() -> String {
    ROLE_CUSTOMER.to_string()
}

/// Settings for [`TokenVerifier`].
#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Required `aud` claim, when the platform sets one.
    pub audience: Option<String>,
    /// Clock skew tolerated on `exp`.
    pub leeway_secs: u64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("audience", &self.audience)
            .field("leeway_secs", &self.leeway_secs)
            .finish()
    }
}

impl JwtConfig {
    /// No audience check, 30 s leeway.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            audience: None,
            leeway_secs: 30,
        }
    }

    /// `JWT_SECRET` (required), `JWT_AUDIENCE`, `JWT_LEEWAY_SECS`.
    ///
    /// # Panics
    ///
    /// Panics when the secret is missing or empty, or the leeway is not a number.
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET").unwrap_or_default();
        assert!(!secret.trim().is_empty(), "JWT_SECRET must be set and non-empty");

        let mut config = Self::new(secret);
        config.audience = std::env::var("JWT_AUDIENCE")
            .ok()
            .filter(|a| !a.trim().is_empty());
        if let Ok(raw) = std::env::var("JWT_LEEWAY_SECS") {
            config.leeway_secs = raw
                .parse()
                .unwrap_or_else(|_| panic!("JWT_LEEWAY_SECS must be a number, got '{raw}'"));
        }
        config
    }
}

/// Why a token was refused. Only logged; clients always see a plain 401.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("signature does not match")]
    BadSignature,
    #[error("audience mismatch")]
    WrongAudience,
    #[error("unknown role '{0}'")]
    UnknownRole(String),
    #[error("malformed token: {0}")]
    Malformed(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature => Self::BadSignature,
            ErrorKind::InvalidAudience => Self::WrongAudience,
            _ => Self::Malformed(err.to_string()),
        }
    }
}

/// Decoding key and validation rules, built once at startup.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.leeway_secs;
        match &config.audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }
        Self {
            key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
        }
    }

    /// Check signature, expiry and audience, then the role claim.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.key, &self.validation)?.claims;
        if !VALID_ROLES.contains(&claims.role.as_str()) {
            return Err(TokenError::UnknownRole(claims.role));
        }
        Ok(claims)
    }
}
