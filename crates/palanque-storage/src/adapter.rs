// SPDX-FileCopyrightText: 2026 Palanque Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the [`DispatchStore`] trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use palanque_config::model::StorageConfig;
use palanque_core::{DispatchStore, PalanqueError, ProviderInstance, ScheduledMessage};

use crate::database::Database;
use crate::queries;

/// SQLite-backed dispatch store.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily initialized on the first
/// call to [`SqliteStore::initialize`].
pub struct SqliteStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given configuration.
    ///
    /// The database connection is not opened until [`initialize`](Self::initialize)
    /// is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Opens the database and runs migrations.
    pub async fn initialize(&self) -> Result<(), PalanqueError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| PalanqueError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite store initialized");
        Ok(())
    }

    /// Checkpoints the WAL and releases the connection.
    pub async fn close(&self) -> Result<(), PalanqueError> {
        self.db()?.close().await
    }

    fn db(&self) -> Result<&Database, PalanqueError> {
        self.db.get().ok_or_else(|| PalanqueError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }

    // --- Configuration-surface operations (not part of DispatchStore) ---

    /// Create a provider instance. Returns its id.
    pub async fn create_instance(
        &self,
        base_url: &str,
        api_key: &str,
        session_name: &str,
    ) -> Result<i64, PalanqueError> {
        queries::instances::create_instance(self.db()?, base_url, api_key, session_name).await
    }

    /// List all provider instances.
    pub async fn list_instances(&self) -> Result<Vec<ProviderInstance>, PalanqueError> {
        queries::instances::list_instances(self.db()?).await
    }

    /// Flip an instance's active flag.
    pub async fn set_instance_active(&self, id: i64, active: bool) -> Result<(), PalanqueError> {
        queries::instances::set_instance_active(self.db()?, id, active).await
    }

    /// Schedule a message for delivery. Returns its id.
    pub async fn schedule_message(
        &self,
        instance_id: i64,
        phone_number: &str,
        response_text: Option<&str>,
        scheduled_at: &str,
    ) -> Result<i64, PalanqueError> {
        queries::messages::schedule_message(
            self.db()?,
            instance_id,
            phone_number,
            response_text,
            scheduled_at,
        )
        .await
    }

    /// Look up a message by id.
    pub async fn message(&self, id: i64) -> Result<Option<ScheduledMessage>, PalanqueError> {
        queries::messages::get_message(self.db()?, id).await
    }
}

#[async_trait]
impl DispatchStore for SqliteStore {
    async fn due_messages(&self) -> Result<Vec<ScheduledMessage>, PalanqueError> {
        queries::messages::due_messages(self.db()?).await
    }

    async fn instance(&self, id: i64) -> Result<Option<ProviderInstance>, PalanqueError> {
        queries::instances::get_instance(self.db()?, id).await
    }

    async fn mark_sent(&self, message_id: i64) -> Result<(), PalanqueError> {
        queries::messages::mark_sent(self.db()?, message_id).await
    }

    async fn hash_exists(&self, hash: &str) -> Result<bool, PalanqueError> {
        queries::hashes::hash_exists(self.db()?, hash).await
    }

    async fn save_hash(&self, message_id: i64, hash: &str) -> Result<(), PalanqueError> {
        queries::hashes::save_hash(self.db()?, message_id, hash).await
    }

    async fn remove_hash(&self, message_id: i64) -> Result<(), PalanqueError> {
        queries::hashes::remove_hash(self.db()?, message_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        }
    }

    #[tokio::test]
    async fn initialize_opens_database_at_configured_path() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("init_test.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));

        store.initialize().await.unwrap();
        assert!(db_path.exists(), "database file should be created");
    }

    #[tokio::test]
    async fn initialize_twice_returns_error() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("double_init.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));

        store.initialize().await.unwrap();
        assert!(store.initialize().await.is_err());
    }

    #[tokio::test]
    async fn operations_fail_before_initialize() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("no_init.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));

        assert!(store.due_messages().await.is_err());
    }

    #[tokio::test]
    async fn full_dispatch_contract_through_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("contract.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));
        store.initialize().await.unwrap();

        let instance_id = store
            .create_instance("http://localhost:3000", "key", "campaign-01")
            .await
            .unwrap();

        let resolved = store.instance(instance_id).await.unwrap().unwrap();
        assert_eq!(resolved.session_name, "campaign-01");

        let message_id = store
            .schedule_message(
                instance_id,
                "5511999990000",
                Some("Olá! Como vai?"),
                "2020-01-01T00:00:00.000Z",
            )
            .await
            .unwrap();

        let due = store.due_messages().await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, message_id);

        // Hash reservation round trip.
        assert!(!store.hash_exists("h1").await.unwrap());
        store.save_hash(message_id, "h1").await.unwrap();
        assert!(store.hash_exists("h1").await.unwrap());
        store.remove_hash(message_id).await.unwrap();
        assert!(!store.hash_exists("h1").await.unwrap());

        store.save_hash(message_id, "h1").await.unwrap();
        store.mark_sent(message_id).await.unwrap();
        assert!(store.due_messages().await.unwrap().is_empty());

        store.close().await.unwrap();
    }
}
