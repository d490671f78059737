// SPDX-FileCopyrightText: 2026 Palanque Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound dispatch core for the Palanque service.
//!
//! Three cooperating components, each polling-driven:
//! - [`session::SessionController`] drives gateway sessions through
//!   connect / authenticate / reconnect and owns the QR status poll.
//! - [`worker::DispatchWorker`] finds due messages on a recurring tick,
//!   deduplicates them, and hands them to the delivery engine.
//! - [`delivery::DeliveryEngine`] splits a response into sentence chunks
//!   and sends them with simulated typing cadence.
//!
//! [`Dispatcher`] owns the recurring tick timer and is the host process's
//! start/stop entry point.

pub mod delivery;
pub mod session;
pub mod shutdown;
pub mod suppression;
pub mod worker;

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use palanque_config::model::DispatchConfig;

pub use delivery::DeliveryEngine;
pub use session::{QrSession, SessionController};
pub use suppression::SuppressionList;
pub use worker::{DispatchWorker, message_hash};

/// Arms and disarms the recurring dispatch tick.
///
/// Each firing spawns a [`DispatchWorker::tick`]; the worker's reentrancy
/// guard -- not the timer -- bounds concurrency, so a stuck gateway call
/// delays but never overlaps the next pass.
pub struct Dispatcher {
    worker: Arc<DispatchWorker>,
    tick_interval: Duration,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl Dispatcher {
    pub fn new(worker: Arc<DispatchWorker>, config: &DispatchConfig) -> Self {
        Self {
            worker,
            tick_interval: Duration::from_secs(config.tick_interval_secs),
            cancel: CancellationToken::new(),
            handle: None,
        }
    }

    /// Shared access to the worker (e.g. for the suppression handle).
    pub fn worker(&self) -> &Arc<DispatchWorker> {
        &self.worker
    }

    /// Arms the recurring tick. Idempotent while armed.
    pub fn start(&mut self) {
        if self.handle.is_some() {
            return;
        }

        let worker = self.worker.clone();
        let cancel = self.cancel.clone();
        let tick_interval = self.tick_interval;
        info!(interval_secs = tick_interval.as_secs(), "dispatch timer armed");

        self.handle = Some(tokio::spawn(async move {
            let mut timer = tokio::time::interval(tick_interval);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // interval() fires immediately; the first dispatch pass waits a
            // full period like every other.
            timer.tick().await;

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!("dispatch timer disarmed");
                        break;
                    }
                    _ = timer.tick() => {
                        let worker = worker.clone();
                        tokio::spawn(async move { worker.tick().await });
                    }
                }
            }
        }));
    }

    /// Disarms the timer and waits for the timer task to finish.
    ///
    /// An in-flight dispatch pass is not interrupted; it completes on its
    /// own and no further passes are scheduled.
    pub async fn stop(&mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
        info!("dispatch timer stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palanque_config::model::DeliveryConfig;
    use palanque_test_utils::{MockGateway, MockGatewayFactory, MockStore, fixtures};

    fn dispatcher_with(
        store: Arc<MockStore>,
        gateway: Arc<MockGateway>,
        tick_interval_secs: u64,
    ) -> Dispatcher {
        let config = DispatchConfig {
            tick_interval_secs,
            ..DispatchConfig::default()
        };
        let worker = Arc::new(DispatchWorker::new(
            store,
            Arc::new(MockGatewayFactory::new(gateway)),
            &config,
            DeliveryConfig::default(),
        ));
        Dispatcher::new(worker, &config)
    }

    #[tokio::test(start_paused = true)]
    async fn armed_timer_dispatches_due_messages() {
        let store = Arc::new(MockStore::new());
        let gateway = Arc::new(MockGateway::new("campaign-01"));
        store.add_instance(fixtures::instance(1)).await;
        store
            .add_message(fixtures::due_message(10, 1, "5511999990000", "Bom dia"))
            .await;

        let mut dispatcher = dispatcher_with(store.clone(), gateway.clone(), 10);
        dispatcher.start();

        // One period until the first pass, plus the typing pause inside it.
        tokio::time::sleep(Duration::from_secs(15)).await;
        assert_eq!(gateway.sent_texts().await, vec!["Bom dia"]);
        assert!(store.message(10).await.unwrap().sent);

        dispatcher.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn stop_disarms_the_timer() {
        let store = Arc::new(MockStore::new());
        let gateway = Arc::new(MockGateway::new("campaign-01"));
        store.add_instance(fixtures::instance(1)).await;

        let mut dispatcher = dispatcher_with(store.clone(), gateway.clone(), 10);
        dispatcher.start();
        dispatcher.stop().await;

        // A message becoming due after stop is never picked up.
        store
            .add_message(fixtures::due_message(10, 1, "5511999990000", "Bom dia"))
            .await;
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(gateway.sent_texts().await.is_empty());
        assert!(!store.message(10).await.unwrap().sent);
    }

    #[tokio::test(start_paused = true)]
    async fn start_is_idempotent_while_armed() {
        let store = Arc::new(MockStore::new());
        let gateway = Arc::new(MockGateway::new("campaign-01"));
        store.add_instance(fixtures::instance(1)).await;
        store
            .add_message(fixtures::due_message(10, 1, "5511999990000", "Bom dia"))
            .await;

        let mut dispatcher = dispatcher_with(store.clone(), gateway.clone(), 10);
        dispatcher.start();
        dispatcher.start();

        tokio::time::sleep(Duration::from_secs(15)).await;
        // A doubled timer would have raced a second pass within the window.
        assert_eq!(gateway.sent_texts().await, vec!["Bom dia"]);

        dispatcher.stop().await;
    }
}
