pub mod error;
pub mod in_mem;
pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

pub use crate::preferences::error::PreferenceError;
pub use crate::preferences::in_mem::InMemoryPreferenceStore;
pub use crate::preferences::sqlite::SqlitePreferenceStore;

/// A single named text setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preference {
    pub key: String,
    pub value: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Look up the row stored under `key`, if there is one.
    async fn fetch(&self, key: &str) -> Result<Option<Preference>, PreferenceError>;

    /// Insert the row, or fully replace the value and timestamp of an existing one.
    async fn upsert(
        &self,
        key: &str,
        value: Option<&str>,
        updated_at: DateTime<Utc>,
    ) -> Result<(), PreferenceError>;
}

/// Key-value preferences on top of a [`PreferenceStore`].
///
/// Writes are last-write-wins and reads go straight to the store.
pub struct Preferences<S> {
    store: S,
}

impl<S: PreferenceStore> Preferences<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the stored value for `key`, or `default` when no row exists.
    ///
    /// A row whose value is NULL yields `None`, not `default`.
    #[instrument(skip(self, default))]
    pub async fn get(
        &self,
        key: &str,
        default: Option<&str>,
    ) -> Result<Option<String>, PreferenceError> {
        if key.is_empty() {
            return Ok(default.map(str::to_owned));
        }
        match self.store.fetch(key).await? {
            Some(preference) => {
                debug!("Preference `{}` found", key);
                Ok(preference.value)
            }
            None => {
                debug!("Preference `{}` missing, using default", key);
                Ok(default.map(str::to_owned))
            }
        }
    }

    #[instrument(skip(self, value))]
    pub async fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        if key.is_empty() {
            return Err(PreferenceError::validation("preference key must not be empty"));
        }
        debug!("Setting preference `{}`", key);
        self.store.upsert(key, Some(value), Utc::now()).await
    }
}
