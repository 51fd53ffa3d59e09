//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor. Configuration is read from the environment
//! once at startup and passed in explicitly.

use std::path::PathBuf;
use std::sync::Arc;

use hfd_store::{FsAppStore, StoreError};

use crate::auth::{Credential, CredentialTable};
use crate::error::AppError;

/// Default request body limit for admin uploads (50 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port to bind on `0.0.0.0`.
    pub port: u16,
    /// Apps root directory.
    pub apps_dir: PathBuf,
    /// Request body limit for admin uploads.
    pub max_upload_bytes: usize,
    /// Operators allowed into the admin surface.
    pub credentials: CredentialTable,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            apps_dir: PathBuf::from("apps"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            credentials: CredentialTable::default_operator(),
        }
    }
}

impl AppConfig {
    /// Build configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// Unparseable numeric values fall back to their defaults with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let port = parse_or(&lookup, "PORT", defaults.port);
        let max_upload_bytes =
            parse_or(&lookup, "HFD_MAX_UPLOAD_BYTES", defaults.max_upload_bytes);
        let apps_dir = lookup("HFD_APPS_DIR")
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.apps_dir);

        let mut operators = Vec::new();
        for i in 1.. {
            let (Some(username), Some(password)) = (
                lookup(&format!("USER_{i}_NAME")),
                lookup(&format!("USER_{i}_PASSWORD")),
            ) else {
                break;
            };
            operators.push(Credential::new(username, password));
        }
        let credentials = if operators.is_empty() {
            tracing::warn!(
                "no USER_<i>_NAME/USER_<i>_PASSWORD configured, falling back to the default admin operator"
            );
            defaults.credentials
        } else {
            CredentialTable::new(operators)
        };

        Self {
            port,
            apps_dir,
            max_upload_bytes,
            credentials,
        }
    }
}

fn parse_or<T: std::str::FromStr + Copy>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    match lookup(key) {
        None => default,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "ignoring unparseable configuration value");
            default
        }),
    }
}

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<FsAppStore>,
}

impl AppState {
    /// Open the apps root named by `config` and build the state around it.
    pub fn new(config: AppConfig) -> Result<Self, StoreError> {
        let store = FsAppStore::open(&config.apps_dir)?;
        Ok(Self {
            config: Arc::new(config),
            store: Arc::new(store),
        })
    }

    /// Run a store operation on the blocking thread pool.
    pub async fn with_store<T, F>(&self, op: F) -> Result<T, AppError>
    where
        T: Send + 'static,
        F: FnOnce(&FsAppStore) -> Result<T, AppError> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || op(&store))
            .await
            .map_err(|e| AppError::Internal(format!("store task failed: {e}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let config = AppConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config.port, 8000);
        assert_eq!(config.apps_dir, PathBuf::from("apps"));
        assert_eq!(config.max_upload_bytes, 52_428_800);
        assert!(config.credentials.verify("admin", "admin123").is_some());
    }

    #[test]
    fn reads_numbered_users_until_first_gap() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("PORT", "9001"),
            ("HFD_APPS_DIR", "/srv/apps"),
            ("USER_1_NAME", "alice"),
            ("USER_1_PASSWORD", "wonderland"),
            ("USER_2_NAME", "bob"),
            ("USER_2_PASSWORD", "builder"),
            ("USER_4_NAME", "skipped"),
            ("USER_4_PASSWORD", "never-read"),
        ]));
        assert_eq!(config.port, 9001);
        assert_eq!(config.apps_dir, PathBuf::from("/srv/apps"));
        assert!(config.credentials.verify("alice", "wonderland").is_some());
        assert!(config.credentials.verify("bob", "builder").is_some());
        assert!(config.credentials.verify("skipped", "never-read").is_none());
        assert!(config.credentials.verify("admin", "admin123").is_none());
    }

    #[test]
    fn unparseable_numbers_fall_back() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("PORT", "eighty"),
            ("HFD_MAX_UPLOAD_BYTES", "-1"),
        ]));
        assert_eq!(config.port, 8000);
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }

    #[test]
    fn debug_redacts_passwords() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("USER_1_NAME", "alice"),
            ("USER_1_PASSWORD", "hunter2-secret"),
        ]));
        let debug = format!("{config:?}");
        assert!(debug.contains("alice"));
        assert!(!debug.contains("hunter2-secret"));
    }
}
