// ============================
// crates/backend-lib/src/auth/token.rs
// ============================
/** Signed session tokens
Tokens are compact HS256 JWTs carrying the account id and email. They are not
stored anywhere: a token is valid exactly when its signature checks out under
the process signing secret and its `exp` lies in the future. */
use crate::clock::Clock;
use crate::config::{AuthSettings, MAX_TOKEN_TTL_SECS};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use userbase_common::AccountId;

/// The only accepted signing algorithm
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// Minimum signing secret length in bytes (256 bits for HS256)
pub const MIN_SECRET_LEN: usize = 32;

/// Identity facts embedded in a token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: AccountId,
    pub email: String,
    /// Issued at, seconds since epoch
    pub iat: i64,
    /// Expires at, seconds since epoch
    pub exp: i64,
}

/// A freshly signed token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
    pub expires_at: DateTime<Utc>,
}

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(jsonwebtoken::errors::Error),

    #[error("failed to sign token: {0}")]
    Signing(jsonwebtoken::errors::Error),

    #[error("signing secret must be at least {MIN_SECRET_LEN} bytes")]
    WeakSecret,

    #[error("token TTL must be between 1 and {MAX_TOKEN_TTL_SECS} seconds")]
    InvalidTtl,
}

/// Issues and validates session tokens.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    pub fn new(settings: &AuthSettings, clock: Arc<dyn Clock>) -> Result<Self, TokenError> {
        let secret = settings.jwt_secret.as_bytes();
        if secret.len() < MIN_SECRET_LEN {
            return Err(TokenError::WeakSecret);
        }

        let ttl = Some(settings.token_ttl_secs)
            .filter(|secs| *secs <= MAX_TOKEN_TTL_SECS)
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(Duration::try_seconds)
            .filter(|ttl| *ttl > Duration::zero())
            .ok_or(TokenError::InvalidTtl)?;

        // Expiry is checked against the injected clock in `validate`.
        let mut validation = Validation::new(TOKEN_ALGORITHM);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
            clock,
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a token for `account_id` valid for the configured TTL from now.
    pub fn issue(&self, account_id: AccountId, email: &str) -> Result<IssuedToken, TokenError> {
        let now = self.clock.now();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or(TokenError::InvalidTtl)?;
        let claims = Claims {
            sub: account_id,
            email: email.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(TOKEN_ALGORITHM), &claims, &self.encoding)
            .map_err(TokenError::Signing)?;

        Ok(IssuedToken {
            token,
            claims,
            expires_at,
        })
    }

    /// Verify signature, algorithm and expiry, returning the embedded claims.
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let data =
            decode::<Claims>(token, &self.decoding, &self.validation).map_err(TokenError::Invalid)?;

        if self.clock.now().timestamp() >= data.claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }
}
