use crate::preferences::{Preference, PreferenceError, PreferenceStore};
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

const IN_MEMORY: &str = ":memory:";

#[derive(Debug, Clone)]
pub struct SqlitePreferenceStore {
    pool: SqlitePool,
}

impl SqlitePreferenceStore {
    /// Opens (or creates) the database at `filename`. `:memory:` gives a private in-memory database.
    pub async fn new(filename: &str) -> anyhow::Result<Self> {
        // Get a Sqlite Connection.
        let pool = if filename == IN_MEMORY {
            let options = SqliteConnectOptions::from_str(IN_MEMORY)
                .context("Invalid in-memory SQLite options")?;
            // The database lives only as long as its one connection, so the pool must never reap it.
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await
        } else {
            create_parent_dirs(filename)?;
            let options = SqliteConnectOptions::new()
                .filename(filename)
                .create_if_missing(true);
            SqlitePoolOptions::new()
                .max_connections(1)
                .connect_with(options)
                .await
        }
        .with_context(|| format!("Failed to open SQLite database `{}`", filename))?;

        // Set up the table.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS preferences (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .context("Failed to create preferences table")?;

        // Hand back the instance.
        debug!("Opened preference store `{}`", filename);
        Ok(Self { pool })
    }
}

#[async_trait]
impl PreferenceStore for SqlitePreferenceStore {
    async fn fetch(&self, key: &str) -> Result<Option<Preference>, PreferenceError> {
        // Fetch the row from the database.
        let row = sqlx::query_as::<_, (String, Option<String>, DateTime<Utc>)>(
            "SELECT key, value, updated_at FROM preferences WHERE key = ?",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(key, value, updated_at)| Preference {
            key,
            value,
            updated_at,
        }))
    }

    async fn upsert(
        &self,
        key: &str,
        value: Option<&str>,
        updated_at: DateTime<Utc>,
    ) -> Result<(), PreferenceError> {
        // Insert the row, replacing value and timestamp if the key already exists.
        sqlx::query(
            "INSERT INTO preferences (key, value, updated_at) VALUES (?, ?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .bind(updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn create_parent_dirs<P: AsRef<Path>>(path: P) -> anyhow::Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        // A bare filename has an empty parent; nothing to create.
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory `{}`", parent.display()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::preferences::sqlite::SqlitePreferenceStore;
    use crate::preferences::{PreferenceStore, Preferences};
    use chrono::Utc;

    #[tokio::test]
    async fn test_sqlite_preferences() {
        // When this is dropped, it will delete the file.
        let temp_file = tempfile::NamedTempFile::new().unwrap();
        let filename = temp_file.path().to_str().unwrap();

        let prefs = Preferences::new(SqlitePreferenceStore::new(filename).await.unwrap());
        assert_eq!(prefs.get("hello", Some("default")).await.unwrap(), Some("default".to_string()));
        prefs.set("hello", "world").await.unwrap();
        assert_eq!(prefs.get("hello", None).await.unwrap(), Some("world".to_string()));
        prefs.set("hello", "mom").await.unwrap();
        assert_eq!(prefs.get("hello", None).await.unwrap(), Some("mom".to_string()));

        drop(prefs);
        let prefs_2 = Preferences::new(SqlitePreferenceStore::new(filename).await.unwrap());
        assert_eq!(prefs_2.get("hello", None).await.unwrap(), Some("mom".to_string()));
    }

    #[tokio::test]
    async fn upsert_bumps_timestamp_and_keeps_one_row() {
        let store = SqlitePreferenceStore::new(":memory:").await.unwrap();
        store.upsert("locale", Some("en"), Utc::now()).await.unwrap();
        let first = store.fetch("locale").await.unwrap().unwrap();
        store
            .upsert("locale", Some("fr"), first.updated_at + chrono::Duration::seconds(1))
            .await
            .unwrap();
        let second = store.fetch("locale").await.unwrap().unwrap();

        assert_eq!(second.value.as_deref(), Some("fr"));
        assert!(second.updated_at > first.updated_at);
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM preferences")
            .fetch_one(&store.pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn in_memory_connection_is_never_reaped() {
        let store = SqlitePreferenceStore::new(":memory:").await.unwrap();
        let options = store.pool.options();
        assert_eq!(options.get_min_connections(), 1);
        assert_eq!(options.get_max_connections(), 1);
        assert_eq!(options.get_idle_timeout(), None);
        assert_eq!(options.get_max_lifetime(), None);

        store.upsert("k", Some("v"), Utc::now()).await.unwrap();
        assert_eq!(store.fetch("k").await.unwrap().unwrap().value.as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn null_value_round_trips() {
        let store = SqlitePreferenceStore::new(":memory:").await.unwrap();
        store.upsert("footer", None, Utc::now()).await.unwrap();
        let row = store.fetch("footer").await.unwrap().unwrap();
        assert_eq!(row.value, None);
    }

    #[tokio::test]
    async fn creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs.db");
        let store = SqlitePreferenceStore::new(path.to_str().unwrap()).await.unwrap();
        store.upsert("k", Some("v"), Utc::now()).await.unwrap();
        assert!(path.exists());
    }
}
