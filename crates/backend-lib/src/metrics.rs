// ==============
// crates/backend-lib/src/metrics.rs

//! Central place for metric keys
pub const ACCOUNT_REGISTERED: &str = "accounts.registered";
pub const ACCOUNT_REGISTER_CONFLICT: &str = "accounts.register.conflict";
pub const LOGIN_SUCCESS: &str = "auth.login.success";
pub const LOGIN_FAILURE: &str = "auth.login.failure";
pub const TOKEN_REJECTED: &str = "auth.token.rejected";
pub const PROFILE_UPDATED: &str = "profile.updated";
pub const DIRECTORY_TIMEOUT: &str = "directory.timeout";
