// ==========================
// tests/unit/config_tests.rs
// ==========================
//! Unit tests for the configuration module
use backend_lib::config::{
    LogFormat, Settings, StorageBackend, DEFAULT_TOKEN_TTL_SECS, ENV_PREFIX,
};
use figment::Jail;
use std::path::PathBuf;

const SECRET: &str = "0123456789abcdef0123456789abcdef";

#[test]
fn test_settings_default() {
    let settings = Settings::default();

    assert_eq!(settings.server.host, "127.0.0.1");
    assert_eq!(settings.server.port, 8080);
    assert_eq!(settings.storage.path, PathBuf::from("data"));
    assert_eq!(settings.storage.backend, StorageBackend::FlatFile);
    assert_eq!(settings.auth.token_ttl_secs, DEFAULT_TOKEN_TTL_SECS);
    assert_eq!(settings.log_format, LogFormat::Pretty);
}

#[test]
fn test_defaults_need_a_secret() {
    assert!(Settings::default().validate().is_err());
}

#[test]
fn test_file_then_env_layering() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "userbase.toml",
            r#"
            log_format = "json"

            [server]
            port = 9000

            [storage]
            backend = "memory"
            timeout_ms = 250

            [auth]
            token_ttl_secs = 600
            "#,
        )?;
        jail.set_env(format!("{ENV_PREFIX}AUTH__JWT_SECRET"), SECRET);
        jail.set_env(format!("{ENV_PREFIX}SERVER__PORT"), "9100");

        let settings = Settings::load_from("userbase.toml").unwrap();
        assert_eq!(settings.server.port, 9100);
        assert_eq!(settings.storage.backend, StorageBackend::Memory);
        assert_eq!(settings.storage_timeout().as_millis(), 250);
        assert_eq!(settings.auth.token_ttl_secs, 600);
        assert_eq!(settings.auth.jwt_secret, SECRET);
        assert_eq!(settings.log_format, LogFormat::Json);
        Ok(())
    });
}

#[test]
fn test_missing_file_uses_defaults_and_env() {
    Jail::expect_with(|jail| {
        jail.set_env(format!("{ENV_PREFIX}AUTH__JWT_SECRET"), SECRET);

        let settings = Settings::load_from("absent.toml").unwrap();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.auth.token_ttl_secs, DEFAULT_TOKEN_TTL_SECS);
        Ok(())
    });
}

#[test]
fn test_invalid_values_rejected() {
    Jail::expect_with(|jail| {
        jail.set_env(format!("{ENV_PREFIX}AUTH__JWT_SECRET"), SECRET);
        jail.set_env(format!("{ENV_PREFIX}LOG_LEVEL"), "chatty");
        assert!(Settings::load_from("userbase.toml").is_err());
        Ok(())
    });
}
