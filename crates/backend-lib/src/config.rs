// ============================
// backend-lib/src/config.rs
// ============================
//! Configuration management.
//!
//! Settings are layered: built-in defaults, then a TOML file, then
//! `USERBASE_`-prefixed environment variables (`__` separates nesting, e.g.
//! `USERBASE_AUTH__JWT_SECRET`).
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "USERBASE_";

/// Default session token lifetime: 24 hours
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 60 * 60 * 24;

/// Longest accepted session token lifetime: 30 days
pub const MAX_TOKEN_TTL_SECS: u64 = 60 * 60 * 24 * 30;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] figment::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub storage: StorageSettings,
    pub auth: AuthSettings,
    /// Default tracing filter when `RUST_LOG` is not set
    pub log_level: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    /// Root directory for the flat-file backend
    pub path: PathBuf,
    /// Upper bound for a single directory call
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    Memory,
    FlatFile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Token signing and password hashing settings
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// HMAC secret for session tokens. Required, at least 32 bytes.
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
    pub hash_cost: HashCost,
}

/// scrypt work factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashCost {
    pub log_n: u8,
    pub r: u32,
    pub p: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            storage: StorageSettings::default(),
            auth: AuthSettings::default(),
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::FlatFile,
            path: PathBuf::from("data"),
            timeout_ms: 5_000,
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            hash_cost: HashCost::default(),
        }
    }
}

impl fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSettings")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("hash_cost", &self.hash_cost)
            .finish()
    }
}

impl Default for HashCost {
    fn default() -> Self {
        // scrypt's recommended interactive parameters
        Self {
            log_n: 17,
            r: 8,
            p: 1,
        }
    }
}

impl HashCost {
    /// Minimal cost that still produces valid digests; keeps test suites fast.
    pub fn fast_for_tests() -> Self {
        Self {
            log_n: 4,
            r: 8,
            p: 1,
        }
    }
}

impl Settings {
    /// Layered figment for the given config file
    pub fn figment<P: AsRef<Path>>(path: P) -> Figment {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load and validate settings from `path` plus the environment
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings: Settings = Self::figment(path).extract()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load from `userbase.toml` in the working directory
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("userbase.toml")
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!(
                "log_level must be one of {LOG_LEVELS:?}, got {:?}",
                self.log_level
            )));
        }

        if self.auth.jwt_secret.len() < crate::auth::MIN_SECRET_LEN {
            return Err(ConfigError::Invalid(format!(
                "auth.jwt_secret must be at least {} bytes",
                crate::auth::MIN_SECRET_LEN
            )));
        }

        if self.auth.token_ttl_secs == 0 || self.auth.token_ttl_secs > MAX_TOKEN_TTL_SECS {
            return Err(ConfigError::Invalid(format!(
                "auth.token_ttl_secs must be between 1 and {MAX_TOKEN_TTL_SECS}"
            )));
        }

        if self.storage.timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "storage.timeout_ms must be greater than zero".to_string(),
            ));
        }

        self.bind_addr()?;
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("server address: {e}")))
    }

    pub fn storage_timeout(&self) -> Duration {
        Duration::from_millis(self.storage.timeout_ms)
    }
}
