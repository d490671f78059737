// SPDX-FileCopyrightText: 2026 Palanque Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence contract consumed by the dispatch worker.

use async_trait::async_trait;

use crate::error::PalanqueError;
use crate::types::{ProviderInstance, ScheduledMessage};

/// The slice of the persistence layer the dispatch core depends on.
///
/// Hash reservation must rely on the store's own atomicity (insert into a
/// unique index or equivalent): the hash table is the one resource shared
/// with workers outside this process.
#[async_trait]
pub trait DispatchStore: Send + Sync {
    /// Messages whose scheduled time has elapsed and which are not yet sent.
    async fn due_messages(&self) -> Result<Vec<ScheduledMessage>, PalanqueError>;

    /// Looks up a provider instance by id.
    async fn instance(&self, id: i64) -> Result<Option<ProviderInstance>, PalanqueError>;

    /// Marks a message as sent. Monotonic: a message never reverts to unsent.
    async fn mark_sent(&self, message_id: i64) -> Result<(), PalanqueError>;

    /// Whether a dedup hash is already reserved, by value.
    async fn hash_exists(&self, hash: &str) -> Result<bool, PalanqueError>;

    /// Reserves a dedup hash for a message. Fails if the hash value is
    /// already reserved.
    async fn save_hash(&self, message_id: i64, hash: &str) -> Result<(), PalanqueError>;

    /// Releases the hash reserved for a message, permitting a later retry.
    async fn remove_hash(&self, message_id: i64) -> Result<(), PalanqueError>;
}
