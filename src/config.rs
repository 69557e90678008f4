//! Runtime configuration read from the environment

use std::path::PathBuf;
use std::sync::Arc;

use reqwest::Client;
use tracing::info;

use crate::error::{LakeError, Result};
use crate::storage::{GcsStore, LocalStore, ObjectStore};
use crate::{
    FORCE_RUN_ENV_VAR, GCS_BUCKET_ENV_VAR, GCS_TOKEN_ENV_VAR, LAKE_ROOT_ENV_VAR,
    SLEEPER_AUTH_ENV_VAR, SLEEPER_EMAIL_ENV_VAR, SLEEPER_PASSWORD_ENV_VAR, SLEEPER_USER_ENV_VAR,
    USER_SHEET_ENV_VAR,
};

/// Where tables land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    Gcs { bucket: String, token: String },
    Local { root: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub storage: StorageConfig,
    pub sleeper_user_id: Option<String>,
    pub sleeper_auth_token: Option<String>,
    pub sleeper_email: Option<String>,
    pub sleeper_password: Option<String>,
    pub user_name_sheet_url: Option<String>,
    pub force_run: bool,
}

/// Default directory for the local store: `<data dir>/ffl-lake`.
pub fn default_local_root() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ffl-lake")
}

fn truthy(v: &str) -> bool {
    matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}

impl Config {
    /// Build a config from any key lookup.
    ///
    /// Storage resolution: `FFL_LAKE_ROOT` (or `force_local`) selects a local
    /// directory; otherwise `GCS_BUCKET_NAME` and `GCS_ACCESS_TOKEN` are both
    /// required.
    pub fn from_lookup<F>(lookup: F, force_local: bool) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let storage = match (get(LAKE_ROOT_ENV_VAR), force_local) {
            (Some(root), _) => StorageConfig::Local {
                root: PathBuf::from(root),
            },
            (None, true) => StorageConfig::Local {
                root: default_local_root(),
            },
            (None, false) => {
                let bucket = get(GCS_BUCKET_ENV_VAR).ok_or_else(|| LakeError::MissingConfig {
                    env_var: GCS_BUCKET_ENV_VAR.to_string(),
                })?;
                let token = get(GCS_TOKEN_ENV_VAR).ok_or_else(|| LakeError::MissingConfig {
                    env_var: GCS_TOKEN_ENV_VAR.to_string(),
                })?;
                StorageConfig::Gcs { bucket, token }
            }
        };

        Ok(Self {
            storage,
            sleeper_user_id: get(SLEEPER_USER_ENV_VAR),
            sleeper_auth_token: get(SLEEPER_AUTH_ENV_VAR),
            sleeper_email: get(SLEEPER_EMAIL_ENV_VAR),
            sleeper_password: get(SLEEPER_PASSWORD_ENV_VAR),
            user_name_sheet_url: get(USER_SHEET_ENV_VAR),
            force_run: get(FORCE_RUN_ENV_VAR).is_some_and(|v| truthy(&v)),
        })
    }

    /// Read the process environment, loading `.env` first when present.
    pub fn from_env(force_local: bool) -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            info!(path = %path.display(), "loaded environment file");
        }
        Self::from_lookup(|k| std::env::var(k).ok(), force_local)
    }

    pub fn require_sleeper_user(&self) -> Result<&str> {
        self.sleeper_user_id
            .as_deref()
            .ok_or_else(|| LakeError::MissingConfig {
                env_var: SLEEPER_USER_ENV_VAR.to_string(),
            })
    }

    pub fn require_sleeper_auth(&self) -> Result<&str> {
        self.sleeper_auth_token
            .as_deref()
            .ok_or_else(|| LakeError::MissingConfig {
                env_var: SLEEPER_AUTH_ENV_VAR.to_string(),
            })
    }

    /// Email and password for a GraphQL login, when both are set.
    pub fn sleeper_credentials(&self) -> Option<(&str, &str)> {
        Some((self.sleeper_email.as_deref()?, self.sleeper_password.as_deref()?))
    }

    /// Open the configured object store.
    pub fn open_store(&self, client: &Client) -> Arc<dyn ObjectStore> {
        match &self.storage {
            StorageConfig::Gcs { bucket, token } => {
                info!(bucket = %bucket, "using GCS storage");
                Arc::new(GcsStore::new(client.clone(), bucket.clone(), token.clone()))
            }
            StorageConfig::Local { root } => {
                info!(root = %root.display(), "using local storage");
                Arc::new(LocalStore::new(root.clone()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn test_gcs_config() {
        let config = Config::from_lookup(
            lookup(&[
                (GCS_BUCKET_ENV_VAR, "lake-bucket"),
                (GCS_TOKEN_ENV_VAR, "ya29.token"),
                (SLEEPER_USER_ENV_VAR, "123"),
                (FORCE_RUN_ENV_VAR, "true"),
            ]),
            false,
        )
        .unwrap();

        assert_eq!(
            config.storage,
            StorageConfig::Gcs {
                bucket: "lake-bucket".into(),
                token: "ya29.token".into()
            }
        );
        assert_eq!(config.require_sleeper_user().unwrap(), "123");
        assert!(config.require_sleeper_auth().is_err());
        assert!(config.force_run);
    }

    #[test]
    fn test_missing_bucket_is_reported() {
        let err = Config::from_lookup(lookup(&[(GCS_TOKEN_ENV_VAR, "t")]), false).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("{GCS_BUCKET_ENV_VAR} environment variable not set")
        );
    }

    #[test]
    fn test_local_root_wins() {
        let config = Config::from_lookup(lookup(&[(LAKE_ROOT_ENV_VAR, "/tmp/lake")]), false).unwrap();
        assert_eq!(
            config.storage,
            StorageConfig::Local {
                root: PathBuf::from("/tmp/lake")
            }
        );
        assert!(!config.force_run);
    }

    #[test]
    fn test_force_local_uses_default_root() {
        let config = Config::from_lookup(lookup(&[]), true).unwrap();
        assert_eq!(
            config.storage,
            StorageConfig::Local {
                root: default_local_root()
            }
        );
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = Config::from_lookup(
            lookup(&[(LAKE_ROOT_ENV_VAR, "/x"), (SLEEPER_USER_ENV_VAR, "  ")]),
            false,
        )
        .unwrap();
        assert!(config.sleeper_user_id.is_none());
    }

    #[test]
    fn test_sleeper_credentials_need_both_values() {
        let config = Config::from_lookup(
            lookup(&[(LAKE_ROOT_ENV_VAR, "/x"), (SLEEPER_EMAIL_ENV_VAR, "me@example.com")]),
            false,
        )
        .unwrap();
        assert!(config.sleeper_credentials().is_none());

        let config = Config::from_lookup(
            lookup(&[
                (LAKE_ROOT_ENV_VAR, "/x"),
                (SLEEPER_EMAIL_ENV_VAR, "me@example.com"),
                (SLEEPER_PASSWORD_ENV_VAR, "hunter2"),
            ]),
            false,
        )
        .unwrap();
        assert_eq!(config.sleeper_credentials(), Some(("me@example.com", "hunter2")));
    }
}
