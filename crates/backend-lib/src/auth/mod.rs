// ============================
// backend-lib/src/auth/mod.rs
// ============================
//! Authentication module.

pub mod password;
pub mod token;

pub use password::{CredentialHasher, HashError};
pub use token::{Claims, IssuedToken, TokenError, TokenService, MIN_SECRET_LEN, TOKEN_ALGORITHM};
