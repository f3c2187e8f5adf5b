// ============================
// backend-lib/src/auth/password.rs
// ============================
//! Password hashing and verification.
use crate::config::HashCost;
use scrypt::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Params, Scrypt,
};
use thiserror::Error;
use zeroize::Zeroizing;

#[derive(Error, Debug)]
pub enum HashError {
    #[error("invalid scrypt parameters: {0}")]
    Params(String),

    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// Salted scrypt hasher producing PHC strings (`$scrypt$ln=..,r=..,p=..$salt$hash`).
///
/// The cost is fixed at construction; digests made under an older cost still
/// verify because the parameters travel inside the digest.
#[derive(Debug, Clone, Copy)]
pub struct CredentialHasher {
    params: Params,
}

impl CredentialHasher {
    pub fn new(cost: &HashCost) -> Result<Self, HashError> {
        let params = Params::new(cost.log_n, cost.r, cost.p, Params::RECOMMENDED_LEN)
            .map_err(|e| HashError::Params(e.to_string()))?;
        Ok(Self { params })
    }

    /// Hash a password using scrypt
    pub fn hash(&self, plain: &str) -> Result<String, HashError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Scrypt
            .hash_password_customized(plain.as_bytes(), None, None, self.params, &salt)
            .map_err(|e| HashError::Hash(e.to_string()))?
            .to_string();
        Ok(hash)
    }

    /// Hash a password and wipe the plaintext buffer afterwards
    pub fn hash_secret(&self, plain: Zeroizing<String>) -> Result<String, HashError> {
        self.hash(plain.as_str())
    }

    /// Verify a password against a stored digest. Malformed digests never match.
    pub fn verify(&self, plain: &str, digest: &str) -> bool {
        let parsed_hash = match PasswordHash::new(digest) {
            Ok(h) => h,
            Err(_) => return false,
        };
        Scrypt.verify_password(plain.as_bytes(), &parsed_hash).is_ok()
    }
}
