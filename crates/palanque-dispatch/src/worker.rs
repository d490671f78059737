// SPDX-FileCopyrightText: 2026 Palanque Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scheduled dispatch worker.
//!
//! The sole authority for turning a due [`ScheduledMessage`] into a gateway
//! send. Each pass reserves a content+minute dedup hash before delivering
//! and rolls the reservation back on failure, giving at-least-once delivery
//! with duplicate suppression at minute granularity.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use palanque_config::model::{DeliveryConfig, DispatchConfig};
use palanque_core::{DispatchStore, GatewayFactory, PalanqueError, ScheduledMessage};

use crate::delivery::DeliveryEngine;
use crate::suppression::SuppressionList;

/// Dedup hash for one logical message: SHA-256 over the phone number, the
/// text, and the send time truncated to the minute.
pub fn message_hash(phone: &str, text: &str, at: DateTime<Utc>) -> String {
    let minute = at.format("%Y-%m-%dT%H:%M").to_string();
    let mut hasher = Sha256::new();
    hasher.update(phone.as_bytes());
    hasher.update(b"|");
    hasher.update(text.as_bytes());
    hasher.update(b"|");
    hasher.update(minute.as_bytes());
    hex::encode(hasher.finalize())
}

/// Recurring worker that drains due messages through the delivery engine.
///
/// All mutable state (suppression window, tick guard) is owned by the
/// instance; construct one at process start and share it with the timer
/// by `Arc`.
pub struct DispatchWorker {
    store: Arc<dyn DispatchStore>,
    gateways: Arc<dyn GatewayFactory>,
    delivery: DeliveryEngine,
    suppression: SuppressionList,
    tick_guard: Mutex<()>,
}

impl DispatchWorker {
    pub fn new(
        store: Arc<dyn DispatchStore>,
        gateways: Arc<dyn GatewayFactory>,
        config: &DispatchConfig,
        delivery_config: DeliveryConfig,
    ) -> Self {
        Self {
            store,
            gateways,
            delivery: DeliveryEngine::new(delivery_config),
            suppression: SuppressionList::new(Duration::from_secs(
                config.suppression_window_secs,
            )),
            tick_guard: Mutex::new(()),
        }
    }

    /// Handle for the alternate queue path to mark ids it has already sent.
    pub fn suppression(&self) -> SuppressionList {
        self.suppression.clone()
    }

    /// One dispatch pass.
    ///
    /// Reentrant invocations are no-ops: if a previous pass is still
    /// running, this one returns immediately. Errors never escape the pass;
    /// a per-message failure is logged and the batch continues.
    pub async fn tick(&self) {
        let Ok(_guard) = self.tick_guard.try_lock() else {
            debug!("dispatch pass still running; skipping tick");
            return;
        };

        let messages = match self.store.due_messages().await {
            Ok(messages) => messages,
            Err(e) => {
                error!(error = %e, "failed to fetch due messages");
                return;
            }
        };

        if messages.is_empty() {
            return;
        }
        debug!(count = messages.len(), "processing due messages");

        for message in &messages {
            if let Err(e) = self.process(message).await {
                error!(
                    message_id = message.id,
                    error = %e,
                    "dispatch failed; will retry on a later tick"
                );
            }
        }
    }

    /// Dispatches a single message.
    ///
    /// Skip conditions (suppression, missing or inactive instance, missing
    /// text, duplicate hash) resolve to `Ok`; only delivery and storage
    /// failures surface as errors, after the reserved hash is released.
    async fn process(&self, message: &ScheduledMessage) -> Result<(), PalanqueError> {
        if self.suppression.is_suppressed(message.id).await {
            debug!(
                message_id = message.id,
                "suppressed; already handled by the queue agent"
            );
            return Ok(());
        }

        let Some(instance) = self.store.instance(message.instance_id).await? else {
            warn!(
                message_id = message.id,
                instance_id = message.instance_id,
                "provider instance missing; skipping"
            );
            return Ok(());
        };
        if !instance.active {
            warn!(
                message_id = message.id,
                instance_id = instance.id,
                "provider instance inactive; skipping"
            );
            return Ok(());
        }

        let Some(text) = message
            .response_text
            .as_deref()
            .filter(|t| !t.trim().is_empty())
        else {
            warn!(message_id = message.id, "no generated response text; skipping");
            return Ok(());
        };

        let gateway = match self.gateways.create(&instance) {
            Ok(gateway) => gateway,
            Err(e) => {
                warn!(
                    message_id = message.id,
                    instance_id = instance.id,
                    error = %e,
                    "gateway client rejected instance credentials; skipping"
                );
                return Ok(());
            }
        };

        let hash = message_hash(&message.phone_number, text, Utc::now());
        if self.store.hash_exists(&hash).await? {
            info!(
                message_id = message.id,
                "duplicate within the minute window; marking sent without delivery"
            );
            self.store.mark_sent(message.id).await?;
            return Ok(());
        }

        self.store.save_hash(message.id, &hash).await?;

        match self
            .delivery
            .deliver(gateway.as_ref(), &message.phone_number, text)
            .await
        {
            Ok(()) => {
                self.store.mark_sent(message.id).await?;
                info!(
                    message_id = message.id,
                    phone = %message.phone_number,
                    "message dispatched"
                );
                Ok(())
            }
            Err(e) => {
                // Release the reservation so a later tick can retry.
                if let Err(remove_err) = self.store.remove_hash(message.id).await {
                    error!(
                        message_id = message.id,
                        error = %remove_err,
                        "failed to release hash after delivery failure"
                    );
                }
                Err(e)
            }
        }
    }
}
