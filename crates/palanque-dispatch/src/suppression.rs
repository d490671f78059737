// SPDX-FileCopyrightText: 2026 Palanque Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Short-lived suppression of message ids handled by the clone-agent queue.
//!
//! A second queue-processing path may generate and send the same logical
//! message; marking the id here keeps the dispatch worker from re-sending
//! it for a bounded window. Entries live only in this process -- the
//! persisted dedup hash remains the durable idempotency backstop.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Cloneable handle to the suppression window shared between the dispatch
/// worker and the alternate queue path.
#[derive(Clone)]
pub struct SuppressionList {
    window: Duration,
    entries: Arc<Mutex<HashMap<i64, Instant>>>,
}

impl SuppressionList {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Suppress a message id for the configured window.
    ///
    /// Re-suppressing an id restarts its window.
    pub async fn suppress(&self, message_id: i64) {
        let expiry = Instant::now() + self.window;
        self.entries.lock().await.insert(message_id, expiry);
    }

    /// Whether the id is currently suppressed. Expired entries are pruned
    /// on the way through.
    pub async fn is_suppressed(&self, message_id: i64) -> bool {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        entries.retain(|_, expiry| *expiry > now);
        entries.contains_key(&message_id)
    }

    /// Number of live (possibly expired, not yet pruned) entries.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}
