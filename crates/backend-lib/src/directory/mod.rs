// ============================
// backend-lib/src/directory/mod.rs
// ============================
//! Account directory abstraction with in-memory and flat-file implementations.
//!
//! Implementations own their synchronization: email uniqueness and the
//! profile read-merge-write are atomic inside the directory, never split
//! across two calls by the caller.
mod flat_file;
mod memory;

pub use flat_file::FlatFileDirectory;
pub use memory::MemoryDirectory;

use crate::profile::ProfileExtension;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use userbase_common::{AccountId, Gender, ProfilePatch};

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("account not found")]
    NotFound,

    #[error("email already registered")]
    DuplicateEmail,

    #[error("failed to encode record: {0}")]
    Serialization(#[source] serde_json::Error),

    #[error("corrupt record at {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("directory call timed out after {0:?}")]
    Timeout(Duration),
}

/// Stored identity record
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    /// Email as supplied at registration; compared case-insensitively
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub dob: NaiveDate,
    pub gender: Gender,
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("dob", &self.dob)
            .field("gender", &self.gender)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Fields of an account about to be created. The directory assigns the id.
#[derive(Clone)]
pub struct NewAccount {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub dob: NaiveDate,
    pub gender: Gender,
    pub created_at: DateTime<Utc>,
}

impl NewAccount {
    fn into_account(self, id: AccountId) -> Account {
        Account {
            id,
            email: self.email,
            password_hash: self.password_hash,
            first_name: self.first_name,
            last_name: self.last_name,
            dob: self.dob,
            gender: self.gender,
            created_at: self.created_at,
        }
    }
}

/// Account joined with its (optional) profile extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRecord {
    pub account: Account,
    pub extension: Option<ProfileExtension>,
}

/// Trait for account directory backends
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Insert a new account. Fails with `DuplicateEmail` if the email is
    /// already taken, compared case-insensitively.
    async fn create_account(&self, account: NewAccount) -> Result<Account, DirectoryError>;

    /// Look up an account by email, case-insensitively
    async fn find_by_email(&self, email: &str) -> Result<Account, DirectoryError>;

    /// Load an account together with its profile extension
    async fn find_by_id(&self, id: AccountId) -> Result<AccountRecord, DirectoryError>;

    /// Merge `patch` into the stored profile extension (inserting it if
    /// missing) and persist the full result, atomically per account.
    async fn upsert_profile_extension(
        &self,
        id: AccountId,
        patch: &ProfilePatch,
        now: DateTime<Utc>,
    ) -> Result<ProfileExtension, DirectoryError>;
}

/// Canonical form used for email uniqueness and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
