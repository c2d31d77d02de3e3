use crate::preferences::{Preference, PreferenceError, PreferenceStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;

/// Process-local store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPreferenceStore {
    rows: Arc<DashMap<String, Preference>>,
}

impl InMemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[async_trait]
impl PreferenceStore for InMemoryPreferenceStore {
    async fn fetch(&self, key: &str) -> Result<Option<Preference>, PreferenceError> {
        Ok(self.rows.get(key).map(|row| row.value().clone()))
    }

    async fn upsert(
        &self,
        key: &str,
        value: Option<&str>,
        updated_at: DateTime<Utc>,
    ) -> Result<(), PreferenceError> {
        let row = Preference {
            key: key.to_string(),
            value: value.map(str::to_owned),
            updated_at,
        };
        self.rows.insert(key.to_string(), row);
        Ok(())
    }
}
