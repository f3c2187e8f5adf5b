//! In-process account directory.
use super::{
    normalize_email, Account, AccountDirectory, AccountRecord, DirectoryError, NewAccount,
};
use crate::profile::{self, ProfileExtension};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use userbase_common::{AccountId, ProfilePatch};

#[derive(Default)]
struct Tables {
    accounts: HashMap<AccountId, Account>,
    /// normalized email -> account id; doubles as the unique constraint
    emails: HashMap<String, AccountId>,
    profiles: HashMap<AccountId, ProfileExtension>,
}

/// Directory held entirely in memory. All tables sit behind one lock, so
/// every operation is a single critical section.
#[derive(Default)]
pub struct MemoryDirectory {
    tables: RwLock<Tables>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn account_count(&self) -> usize {
        self.tables.read().accounts.len()
    }
}

#[async_trait]
impl AccountDirectory for MemoryDirectory {
    async fn create_account(&self, account: NewAccount) -> Result<Account, DirectoryError> {
        let key = normalize_email(&account.email);
        let mut tables = self.tables.write();

        if tables.emails.contains_key(&key) {
            return Err(DirectoryError::DuplicateEmail);
        }

        let id = AccountId::new();
        let account = account.into_account(id);
        tables.emails.insert(key, id);
        tables.accounts.insert(id, account.clone());
        Ok(account)
    }

    async fn find_by_email(&self, email: &str) -> Result<Account, DirectoryError> {
        let tables = self.tables.read();
        tables
            .emails
            .get(&normalize_email(email))
            .and_then(|id| tables.accounts.get(id))
            .cloned()
            .ok_or(DirectoryError::NotFound)
    }

    async fn find_by_id(&self, id: AccountId) -> Result<AccountRecord, DirectoryError> {
        let tables = self.tables.read();
        let account = tables.accounts.get(&id).cloned().ok_or(DirectoryError::NotFound)?;
        Ok(AccountRecord {
            account,
            extension: tables.profiles.get(&id).cloned(),
        })
    }

    async fn upsert_profile_extension(
        &self,
        id: AccountId,
        patch: &ProfilePatch,
        now: DateTime<Utc>,
    ) -> Result<ProfileExtension, DirectoryError> {
        let mut tables = self.tables.write();
        if !tables.accounts.contains_key(&id) {
            return Err(DirectoryError::NotFound);
        }

        let merged = profile::merge(tables.profiles.get(&id), patch, now);
        tables.profiles.insert(id, merged.clone());
        Ok(merged)
    }
}
