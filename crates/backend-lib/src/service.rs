// ============================
// crates/backend-lib/src/service.rs
// ============================
//! Account operations behind the HTTP handlers.
//!
//! The service validates input, hashes passwords off the async runtime,
//! issues tokens and drives the directory. Every directory call is bounded by
//! the configured storage timeout.
use crate::auth::{CredentialHasher, IssuedToken, TokenService};
use crate::clock::Clock;
use crate::directory::{AccountDirectory, DirectoryError, NewAccount};
use crate::error::AppError;
use crate::metrics::{
    ACCOUNT_REGISTERED, ACCOUNT_REGISTER_CONFLICT, DIRECTORY_TIMEOUT, LOGIN_FAILURE,
    LOGIN_SUCCESS, PROFILE_UPDATED,
};
use crate::profile::{self, ProfileExtension};
use crate::validation::validate_registration;
use metrics::counter;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};
use userbase_common::{AccountId, LoginRequest, ProfilePatch, ProfileView, RegisterRequest};
use zeroize::Zeroizing;

// Verified against when the email is unknown so both login failures cost the same
const DUMMY_PASSWORD: &str = "Dummy-Password-For-Timing!";

pub struct AccountService {
    directory: Arc<dyn AccountDirectory>,
    hasher: CredentialHasher,
    tokens: Arc<TokenService>,
    clock: Arc<dyn Clock>,
    timeout: Duration,
    dummy_hash: Arc<str>,
}

impl AccountService {
    pub fn new(
        directory: Arc<dyn AccountDirectory>,
        hasher: CredentialHasher,
        tokens: Arc<TokenService>,
        clock: Arc<dyn Clock>,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let dummy_hash = hasher.hash(DUMMY_PASSWORD)?.into();
        Ok(Self {
            directory,
            hasher,
            tokens,
            clock,
            timeout,
            dummy_hash,
        })
    }

    /// Validate and store a new account, returning its id
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, mut request: RegisterRequest) -> Result<AccountId, AppError> {
        validate_registration(&request, self.clock.today())?;

        let password = Zeroizing::new(std::mem::take(&mut request.password));
        let hasher = self.hasher;
        let password_hash =
            tokio::task::spawn_blocking(move || hasher.hash_secret(password)).await??;

        let new_account = NewAccount {
            email: request.email,
            password_hash,
            first_name: request.first_name,
            last_name: request.last_name,
            dob: request.dob,
            gender: request.gender,
            created_at: self.clock.now(),
        };

        match self.bounded(self.directory.create_account(new_account)).await {
            Ok(account) => {
                counter!(ACCOUNT_REGISTERED).increment(1);
                info!(account_id = %account.id, "account registered");
                Ok(account.id)
            },
            Err(DirectoryError::DuplicateEmail) => {
                counter!(ACCOUNT_REGISTER_CONFLICT).increment(1);
                Err(AppError::Conflict)
            },
            Err(e) => Err(e.into()),
        }
    }

    /// Check credentials and issue a session token
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> Result<IssuedToken, AppError> {
        let account = match self.bounded(self.directory.find_by_email(&request.email)).await {
            Ok(account) => Some(account),
            Err(DirectoryError::NotFound) => None,
            Err(e) => return Err(e.into()),
        };

        let digest: Arc<str> = match &account {
            Some(account) => account.password_hash.as_str().into(),
            None => self.dummy_hash.clone(),
        };
        let password = Zeroizing::new(request.password);
        let hasher = self.hasher;
        let matches =
            tokio::task::spawn_blocking(move || hasher.verify(password.as_str(), &digest))
                .await?;

        let account = match account {
            Some(account) if matches => account,
            _ => {
                counter!(LOGIN_FAILURE).increment(1);
                warn!("login rejected");
                return Err(AppError::InvalidCredentials);
            },
        };

        let issued = self.tokens.issue(account.id, &account.email)?;
        counter!(LOGIN_SUCCESS).increment(1);
        info!(account_id = %account.id, "login succeeded");
        Ok(issued)
    }

    /// Account joined with its profile extension, age computed as of today
    #[instrument(skip(self))]
    pub async fn get_profile(&self, id: AccountId) -> Result<ProfileView, AppError> {
        let record = self.bounded(self.directory.find_by_id(id)).await?;
        Ok(profile::build_view(
            &record.account,
            record.extension.as_ref(),
            self.clock.today(),
        ))
    }

    /// Merge `patch` into the account's profile extension
    #[instrument(skip(self, patch))]
    pub async fn update_profile(
        &self,
        id: AccountId,
        patch: ProfilePatch,
    ) -> Result<ProfileExtension, AppError> {
        let now = self.clock.now();
        let merged = self
            .bounded(self.directory.upsert_profile_extension(id, &patch, now))
            .await?;
        counter!(PROFILE_UPDATED).increment(1);
        info!(account_id = %id, "profile updated");
        Ok(merged)
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T, DirectoryError>
    where
        F: Future<Output = Result<T, DirectoryError>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                counter!(DIRECTORY_TIMEOUT).increment(1);
                warn!(timeout = ?self.timeout, "directory call timed out");
                Err(DirectoryError::Timeout(self.timeout))
            },
        }
    }
}
