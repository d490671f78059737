// SPDX-FileCopyrightText: 2026 Palanque Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory `DispatchStore` for unit tests.
//!
//! Mirrors the semantics the SQLite store guarantees: monotonic sent flags
//! and hash reservations unique by value.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::Mutex;

use palanque_core::{
    DispatchStore, PalanqueError, ProviderInstance, ScheduledMessage, timestamp_now,
};

#[derive(Default)]
struct State {
    instances: HashMap<i64, ProviderInstance>,
    messages: BTreeMap<i64, ScheduledMessage>,
    /// message id -> reserved hash value.
    hashes: HashMap<i64, String>,
}

/// An in-memory store double.
#[derive(Default)]
pub struct MockStore {
    state: Mutex<State>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_instance(&self, instance: ProviderInstance) {
        self.state
            .lock()
            .await
            .instances
            .insert(instance.id, instance);
    }

    pub async fn add_message(&self, message: ScheduledMessage) {
        self.state.lock().await.messages.insert(message.id, message);
    }

    pub async fn message(&self, id: i64) -> Option<ScheduledMessage> {
        self.state.lock().await.messages.get(&id).cloned()
    }

    /// The hash value currently reserved for a message, if any.
    pub async fn hash_for(&self, message_id: i64) -> Option<String> {
        self.state.lock().await.hashes.get(&message_id).cloned()
    }

    pub async fn hash_count(&self) -> usize {
        self.state.lock().await.hashes.len()
    }

    /// Pre-reserve a hash value, as if an earlier attempt succeeded.
    pub async fn seed_hash(&self, message_id: i64, hash: &str) {
        self.state
            .lock()
            .await
            .hashes
            .insert(message_id, hash.to_string());
    }
}

#[async_trait]
impl DispatchStore for MockStore {
    async fn due_messages(&self) -> Result<Vec<ScheduledMessage>, PalanqueError> {
        let now = timestamp_now();
        Ok(self
            .state
            .lock()
            .await
            .messages
            .values()
            .filter(|m| !m.sent && m.scheduled_at <= now)
            .cloned()
            .collect())
    }

    async fn instance(&self, id: i64) -> Result<Option<ProviderInstance>, PalanqueError> {
        Ok(self.state.lock().await.instances.get(&id).cloned())
    }

    async fn mark_sent(&self, message_id: i64) -> Result<(), PalanqueError> {
        let mut state = self.state.lock().await;
        if let Some(message) = state.messages.get_mut(&message_id)
            && !message.sent
        {
            message.sent = true;
            message.sent_at = Some(timestamp_now());
        }
        Ok(())
    }

    async fn hash_exists(&self, hash: &str) -> Result<bool, PalanqueError> {
        Ok(self
            .state
            .lock()
            .await
            .hashes
            .values()
            .any(|h| h == hash))
    }

    async fn save_hash(&self, message_id: i64, hash: &str) -> Result<(), PalanqueError> {
        let mut state = self.state.lock().await;
        let duplicate = state.hashes.contains_key(&message_id)
            || state.hashes.values().any(|h| h == hash);
        if duplicate {
            return Err(PalanqueError::Storage {
                source: "hash already reserved".into(),
            });
        }
        state.hashes.insert(message_id, hash.to_string());
        Ok(())
    }

    async fn remove_hash(&self, message_id: i64) -> Result<(), PalanqueError> {
        self.state.lock().await.hashes.remove(&message_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[tokio::test]
    async fn due_excludes_sent_and_future_messages() {
        let store = MockStore::new();
        store.add_message(fixtures::due_message(1, 1, "p1", "a")).await;

        let mut sent = fixtures::due_message(2, 1, "p2", "b");
        sent.sent = true;
        store.add_message(sent).await;

        let mut future = fixtures::due_message(3, 1, "p3", "c");
        future.scheduled_at = "2099-01-01T00:00:00.000Z".into();
        store.add_message(future).await;

        let due = store.due_messages().await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, 1);
    }

    #[tokio::test]
    async fn save_hash_rejects_duplicate_value() {
        let store = MockStore::new();
        store.save_hash(1, "same").await.unwrap();
        assert!(store.save_hash(2, "same").await.is_err());
    }

    #[tokio::test]
    async fn mark_sent_is_monotonic() {
        let store = MockStore::new();
        store.add_message(fixtures::due_message(1, 1, "p", "t")).await;

        store.mark_sent(1).await.unwrap();
        let first_sent_at = store.message(1).await.unwrap().sent_at;
        store.mark_sent(1).await.unwrap();
        assert_eq!(store.message(1).await.unwrap().sent_at, first_sent_at);
    }
}
