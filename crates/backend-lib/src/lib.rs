// ============================
// backend-lib/src/lib.rs
// ============================
//! Core functionality for the `userbase` account server: credential hashing,
//! session tokens, the access gate, profile merging and account storage.

pub mod auth;
pub mod clock;
pub mod config;
pub mod directory;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod profile;
pub mod routes;
pub mod service;
pub mod validation;

use crate::auth::{CredentialHasher, TokenService};
use crate::clock::{Clock, SystemClock};
use crate::config::{Settings, StorageBackend};
use crate::directory::{AccountDirectory, FlatFileDirectory, MemoryDirectory};
use crate::service::AccountService;
use anyhow::Context;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Account operations
    pub accounts: Arc<AccountService>,
    /// Token issuing and validation, used by the access gate
    pub tokens: Arc<TokenService>,
    /// Settings the state was built from
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Create a new application state over an existing directory
    pub fn new(
        directory: Arc<dyn AccountDirectory>,
        settings: Settings,
        clock: Arc<dyn Clock>,
    ) -> anyhow::Result<Self> {
        let tokens = Arc::new(
            TokenService::new(&settings.auth, clock.clone()).context("token service")?,
        );
        let hasher = CredentialHasher::new(&settings.auth.hash_cost).context("password hasher")?;
        let accounts = Arc::new(
            AccountService::new(
                directory,
                hasher,
                tokens.clone(),
                clock,
                settings.storage_timeout(),
            )
            .context("account service")?,
        );

        Ok(Self {
            accounts,
            tokens,
            settings: Arc::new(settings),
        })
    }

    /// Create the state described by `settings`, opening the configured directory
    pub fn from_settings(settings: Settings) -> anyhow::Result<Self> {
        let directory: Arc<dyn AccountDirectory> = match settings.storage.backend {
            StorageBackend::Memory => Arc::new(MemoryDirectory::new()),
            StorageBackend::FlatFile => Arc::new(FlatFileDirectory::new(&settings.storage.path)?),
        };
        tracing::info!(backend = ?settings.storage.backend, "account directory ready");
        Self::new(directory, settings, Arc::new(SystemClock))
    }
}
