//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Demo admin account used when no credentials are configured.
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@instastore.local";
const DEFAULT_ADMIN_PASSWORD: &str = "instastore123";

/// Storefront configuration, read from the environment at startup.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Port for the HTTP API.
    pub port: u16,
    /// Path of the libSQL database backing the key-value store.
    pub db_path: PathBuf,
    /// Advisor webhook URL. Without one, the chat runs on scripted prompts only.
    pub webhook_url: Option<String>,
    /// Upper bound on a single webhook call.
    pub responder_timeout: Duration,
    /// Chat sessions untouched for this long are discarded.
    pub chat_idle_ttl: Duration,
    /// Admin credentials checked by the session holder.
    pub admin: AdminCredentials,
}

/// The single hardcoded admin account.
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub email: String,
    pub password: SecretString,
}

impl Default for AdminCredentials {
    fn default() -> Self {
        Self {
            email: DEFAULT_ADMIN_EMAIL.to_string(),
            password: SecretString::from(DEFAULT_ADMIN_PASSWORD),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            db_path: PathBuf::from("./data/instastore.db"),
            webhook_url: None,
            responder_timeout: Duration::from_secs(30),
            chat_idle_ttl: Duration::from_secs(30 * 60),
            admin: AdminCredentials::default(),
        }
    }
}

impl StoreConfig {
    /// Build configuration from `INSTASTORE_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("INSTASTORE_PORT") {
            Some(raw) => raw.trim().parse().map_err(|e| ConfigError::InvalidValue {
                key: "INSTASTORE_PORT".to_string(),
                message: format!("{e}"),
            })?,
            None => defaults.port,
        };

        let responder_timeout = positive_secs(
            &lookup,
            "INSTASTORE_RESPONDER_TIMEOUT_SECS",
            defaults.responder_timeout,
        )?;
        let chat_idle_ttl = positive_secs(
            &lookup,
            "INSTASTORE_CHAT_IDLE_TTL_SECS",
            defaults.chat_idle_ttl,
        )?;

        let db_path = lookup("INSTASTORE_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);

        let webhook_url = lookup("INSTASTORE_WEBHOOK_URL")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let admin = AdminCredentials {
            email: lookup("INSTASTORE_ADMIN_EMAIL").unwrap_or(defaults.admin.email),
            password: lookup("INSTASTORE_ADMIN_PASSWORD")
                .map(SecretString::from)
                .unwrap_or(defaults.admin.password),
        };

        Ok(Self {
            port,
            db_path,
            webhook_url,
            responder_timeout,
            chat_idle_ttl,
            admin,
        })
    }
}

/// Read a non-zero number of seconds, falling back to `default` when unset.
fn positive_secs<F>(lookup: &F, key: &str, default: Duration) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    let secs: u64 = raw.trim().parse().map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("{e}"),
    })?;
    if secs == 0 {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "must be greater than zero".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}
