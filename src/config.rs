use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::AppError;

const DEFAULT_DATABASE_URL: &str = "sqlite://todo-portal.db?mode=rwc";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Connection details for the hosted GraphQL collection API.
#[derive(Clone, Debug)]
pub struct RemoteConfig {
    pub endpoint: String,
    pub api_key: String,
    pub api_key_expires_at: Option<DateTime<Utc>>,
}

impl RemoteConfig {
    pub fn api_key_expired(&self, now: DateTime<Utc>) -> bool {
        self.api_key_expires_at.is_some_and(|expires| expires <= now)
    }
}

#[derive(Clone, Debug)]
pub enum BackendConfig {
    Remote(RemoteConfig),
    /// No endpoint configured: records live in the local SQLite database.
    Local,
}

/// Process-wide configuration, resolved once in `main` and handed to
/// every component that needs it.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub request_timeout: Duration,
    pub backend: BackendConfig,
}

impl AppConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Config(format!("BIND_ADDR is invalid: {}", e)))?;

        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let request_timeout = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| AppError::Config(format!("REQUEST_TIMEOUT_SECS is invalid: {}", e)))?,
            None => Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        };

        let backend = match lookup("TODO_API_ENDPOINT").filter(|s| !s.trim().is_empty()) {
            Some(endpoint) => {
                let api_key = lookup("TODO_API_KEY")
                    .filter(|s| !s.trim().is_empty())
                    .ok_or_else(|| AppError::Config("TODO_API_KEY is not set".to_string()))?;
                let api_key_expires_at = lookup("TODO_API_KEY_EXPIRES_AT")
                    .map(|raw| {
                        DateTime::parse_from_rfc3339(&raw)
                            .map(|dt| dt.with_timezone(&Utc))
                            .map_err(|e| {
                                AppError::Config(format!("TODO_API_KEY_EXPIRES_AT is invalid: {}", e))
                            })
                    })
                    .transpose()?;

                BackendConfig::Remote(RemoteConfig {
                    endpoint,
                    api_key,
                    api_key_expires_at,
                })
            }
            None => BackendConfig::Local,
        };

        Ok(Self {
            bind_addr,
            database_url,
            request_timeout,
            backend,
        })
    }
}
