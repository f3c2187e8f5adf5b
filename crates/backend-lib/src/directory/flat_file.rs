// ============================
// backend-lib/src/directory/flat_file.rs
// ============================
//! Flat-file account directory.
//!
//! Layout under the root:
//! - `accounts/<id>/account.json`
//! - `accounts/<id>/profile.json` (written on the first profile update)
//! - `emails/<email-key>.id` containing the owning account id, where the key
//!   is a name-based UUID of the normalized email
//!
//! An email is claimed by hard-linking a fully written temp file onto its
//! index path, which fails if the path exists. Profile upserts are serialized
//! per account and replace `profile.json` with an atomic rename.
use super::{
    normalize_email, Account, AccountDirectory, AccountRecord, DirectoryError, NewAccount,
};
use crate::profile::{self, ProfileExtension};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::{fs as tokio_fs, io::AsyncWriteExt, sync::Mutex};
use tracing::{debug, warn};
use userbase_common::{AccountId, ProfilePatch};
use uuid::Uuid;

const ACCOUNT_FILE: &str = "account.json";
const PROFILE_FILE: &str = "profile.json";

/// Namespace for email index keys. Changing it orphans every existing index entry.
const EMAIL_NAMESPACE: Uuid = Uuid::from_u128(0x5f0c_8e2a_3b71_4d19_a6c4_92e1_07bd_c35a);

/// Flat-file implementation of the `AccountDirectory` trait
#[derive(Clone)]
pub struct FlatFileDirectory {
    root: PathBuf,
    profile_locks: Arc<DashMap<AccountId, Arc<Mutex<()>>>>,
}

impl FlatFileDirectory {
    pub fn new<P: AsRef<Path>>(root: P) -> anyhow::Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join("accounts"))?;
        fs::create_dir_all(root.join("emails"))?;
        Ok(Self {
            root,
            profile_locks: Arc::new(DashMap::new()),
        })
    }

    fn account_dir(&self, id: AccountId) -> PathBuf {
        self.root.join("accounts").join(id.to_string())
    }

    fn email_path(&self, email: &str) -> PathBuf {
        self.root
            .join("emails")
            .join(format!("{}.id", email_key(&normalize_email(email))))
    }

    fn profile_lock(&self, id: AccountId) -> Arc<Mutex<()>> {
        self.profile_locks.entry(id).or_default().clone()
    }

    async fn read_account(&self, id: AccountId) -> Result<Account, DirectoryError> {
        read_json(&self.account_dir(id).join(ACCOUNT_FILE))
            .await?
            .ok_or(DirectoryError::NotFound)
    }
}

#[async_trait]
impl AccountDirectory for FlatFileDirectory {
    async fn create_account(&self, account: NewAccount) -> Result<Account, DirectoryError> {
        let id = AccountId::new();
        let email_path = self.email_path(&account.email);
        let account = account.into_account(id);

        let dir = self.account_dir(id);
        tokio_fs::create_dir_all(&dir).await?;

        // Claim the email only once the account it points at is complete
        let written = async {
            write_json_atomic(&dir.join(ACCOUNT_FILE), &account).await?;
            claim_email(&email_path, id).await
        }
        .await;

        if let Err(err) = written {
            if let Err(cleanup) = tokio_fs::remove_dir_all(&dir).await {
                warn!(account_id = %id, error = %cleanup, "failed to remove orphaned account directory");
            }
            return Err(err);
        }

        debug!(account_id = %id, "account created");
        Ok(account)
    }

    async fn find_by_email(&self, email: &str) -> Result<Account, DirectoryError> {
        let path = self.email_path(email);
        let content = match tokio_fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Err(DirectoryError::NotFound),
            Err(err) => return Err(err.into()),
        };

        let id: AccountId = content.trim().parse().map_err(|_| {
            DirectoryError::Io(std::io::Error::new(
                ErrorKind::InvalidData,
                format!("bad account id in {}", path.display()),
            ))
        })?;
        self.read_account(id).await
    }

    async fn find_by_id(&self, id: AccountId) -> Result<AccountRecord, DirectoryError> {
        let account = self.read_account(id).await?;
        let extension = read_json(&self.account_dir(id).join(PROFILE_FILE)).await?;
        Ok(AccountRecord { account, extension })
    }

    async fn upsert_profile_extension(
        &self,
        id: AccountId,
        patch: &ProfilePatch,
        now: DateTime<Utc>,
    ) -> Result<ProfileExtension, DirectoryError> {
        let lock = self.profile_lock(id);
        let result = {
            let _guard = lock.lock().await;
            self.merge_profile(id, patch, now).await
        };

        // Only the map and `lock` hold it: nobody is queued on this account
        self.profile_locks
            .remove_if(&id, |_, held| Arc::strong_count(held) == 2);
        result
    }
}

impl FlatFileDirectory {
    async fn merge_profile(
        &self,
        id: AccountId,
        patch: &ProfilePatch,
        now: DateTime<Utc>,
    ) -> Result<ProfileExtension, DirectoryError> {
        let dir = self.account_dir(id);
        if !tokio_fs::try_exists(dir.join(ACCOUNT_FILE)).await? {
            return Err(DirectoryError::NotFound);
        }

        let path = dir.join(PROFILE_FILE);
        let existing: Option<ProfileExtension> = read_json(&path).await?;
        let merged = profile::merge(existing.as_ref(), patch, now);
        write_json_atomic(&path, &merged).await?;
        Ok(merged)
    }
}

/// Fixed-length index key for a normalized email
fn email_key(email: &str) -> Uuid {
    Uuid::new_v5(&EMAIL_NAMESPACE, email.as_bytes())
}

/// Point `email_path` at `id`. Fails with `DuplicateEmail` if already claimed.
async fn claim_email(email_path: &Path, id: AccountId) -> Result<(), DirectoryError> {
    let staged = temp_path(email_path);
    let claim = async {
        write_file(&staged, id.to_string().as_bytes()).await?;
        tokio_fs::hard_link(&staged, email_path).await
    }
    .await;
    let _ = tokio_fs::remove_file(&staged).await;

    claim.map_err(|err| match err.kind() {
        ErrorKind::AlreadyExists => DirectoryError::DuplicateEmail,
        _ => DirectoryError::Io(err),
    })
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.{}.tmp", Uuid::new_v4()))
}

async fn write_file(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio_fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, DirectoryError> {
    let content = match tokio_fs::read(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };

    serde_json::from_slice(&content)
        .map(Some)
        .map_err(|source| DirectoryError::Corrupt {
            path: path.to_path_buf(),
            source,
        })
}

async fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), DirectoryError> {
    let json = serde_json::to_vec_pretty(value).map_err(DirectoryError::Serialization)?;
    let staged = temp_path(path);
    write_file(&staged, &json).await?;
    tokio_fs::rename(&staged, path).await?;
    Ok(())
}
