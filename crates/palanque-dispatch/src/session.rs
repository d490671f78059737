// SPDX-FileCopyrightText: 2026 Palanque Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session lifecycle controller.
//!
//! Drives a gateway session from disconnected to authenticated on operator
//! demand: start the session, surface the QR payload, and poll status until
//! the gateway reports `WORKING`. One authentication flow per instance at a
//! time; starting a new QR flow cancels the previous poll for that instance.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use palanque_config::model::SessionConfig;
use palanque_core::{
    GatewayFactory, PalanqueError, ProviderInstance, SessionStatus, WhatsAppGateway,
};

/// An in-progress QR authentication flow.
///
/// `status` publishes every status observation made by the background poll;
/// the flow is complete once it reports [`SessionStatus::Working`]. The
/// sender side is dropped when the poll retires (authenticated, attempt cap,
/// cancelled), so `changed()` erroring means the flow ended without
/// authentication.
#[derive(Debug)]
pub struct QrSession {
    pub qr: String,
    pub status: watch::Receiver<SessionStatus>,
}

/// Manages gateway-session authentication for one instance at a time.
pub struct SessionController {
    gateways: Arc<dyn GatewayFactory>,
    config: SessionConfig,
    polls: Arc<Mutex<HashMap<i64, CancellationToken>>>,
}

impl SessionController {
    pub fn new(gateways: Arc<dyn GatewayFactory>, config: SessionConfig) -> Self {
        Self {
            gateways,
            config,
            polls: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Current status of the instance's session.
    ///
    /// A session the gateway does not list reads as [`SessionStatus::Stopped`].
    pub async fn status(
        &self,
        instance: &ProviderInstance,
    ) -> Result<SessionStatus, PalanqueError> {
        let gateway = self.gateways.create(instance)?;
        Self::query_status(gateway.as_ref(), &instance.session_name).await
    }

    /// Starts the session and returns the QR flow once the gateway has
    /// produced a code.
    ///
    /// Start failures abort the flow before any QR is surfaced.
    pub async fn connect(
        &self,
        instance: &ProviderInstance,
    ) -> Result<QrSession, PalanqueError> {
        let gateway = self.gateways.create(instance)?;
        gateway.start_session().await?;
        info!(
            instance_id = instance.id,
            session = %instance.session_name,
            "session start requested"
        );

        // The gateway needs a beat after start before the QR is ready.
        tokio::time::sleep(Duration::from_millis(self.config.settle_delay_ms)).await;
        self.fetch_qr(instance).await
    }

    /// Forces a fresh QR for an already-linked account: logout, settle,
    /// connect.
    ///
    /// The logout call is tolerated to fail -- the session may already be
    /// gone -- without aborting the subsequent start.
    pub async fn reconnect(
        &self,
        instance: &ProviderInstance,
    ) -> Result<QrSession, PalanqueError> {
        let gateway = self.gateways.create(instance)?;
        if let Err(e) = gateway.logout_session().await {
            warn!(
                instance_id = instance.id,
                error = %e,
                "logout failed; session may already be gone"
            );
        }
        tokio::time::sleep(Duration::from_millis(self.config.settle_delay_ms)).await;
        self.connect(instance).await
    }

    /// Retrieves the current QR payload and starts the status poll.
    ///
    /// Fails unless the session is in `SCAN_QR_CODE`. Only one poll may be
    /// active per instance; starting a new one cancels any previous poll.
    pub async fn fetch_qr(
        &self,
        instance: &ProviderInstance,
    ) -> Result<QrSession, PalanqueError> {
        let gateway = self.gateways.create(instance)?;
        let status = Self::query_status(gateway.as_ref(), &instance.session_name).await?;
        if status != SessionStatus::ScanQrCode {
            return Err(PalanqueError::Session(format!(
                "QR not available while session is {status}"
            )));
        }

        let qr = gateway.qr_code().await?;
        let status_rx = self.spawn_status_poll(instance, gateway).await;
        Ok(QrSession { qr, status: status_rx })
    }

    /// Cancels the instance's QR poll, if any (operator abandoned the flow).
    pub async fn abandon(&self, instance_id: i64) {
        if let Some(token) = self.polls.lock().await.remove(&instance_id) {
            token.cancel();
            debug!(instance_id, "QR flow abandoned");
        }
    }

    /// Number of live QR polls.
    pub async fn active_polls(&self) -> usize {
        self.polls.lock().await.len()
    }

    async fn query_status(
        gateway: &dyn WhatsAppGateway,
        session_name: &str,
    ) -> Result<SessionStatus, PalanqueError> {
        let sessions = gateway.list_sessions().await?;
        Ok(sessions
            .into_iter()
            .find(|s| s.name == session_name)
            .map(|s| s.status)
            .unwrap_or(SessionStatus::Stopped))
    }

    /// Spawns the recurring status poll for a QR flow.
    ///
    /// The poll observes status every `qr_poll_interval_secs` and retires
    /// when it sees `WORKING`, when the attempt cap is reached, or when it
    /// is cancelled by a newer flow or `abandon`. Poll errors are logged and
    /// the wait continues: a transient hiccup must not kill authentication.
    async fn spawn_status_poll(
        &self,
        instance: &ProviderInstance,
        gateway: Arc<dyn WhatsAppGateway>,
    ) -> watch::Receiver<SessionStatus> {
        let cancel = CancellationToken::new();
        if let Some(previous) = self
            .polls
            .lock()
            .await
            .insert(instance.id, cancel.clone())
        {
            previous.cancel();
            debug!(instance_id = instance.id, "previous QR poll cancelled");
        }

        let (tx, rx) = watch::channel(SessionStatus::ScanQrCode);
        let interval = Duration::from_secs(self.config.qr_poll_interval_secs);
        let max_attempts = self.config.qr_poll_max_attempts;
        let session_name = instance.session_name.clone();
        let instance_id = instance.id;
        let polls = self.polls.clone();

        tokio::spawn(async move {
            let mut authenticated = false;

            for attempt in 1..=max_attempts {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!(instance_id, "QR poll cancelled");
                        break;
                    }
                    _ = tokio::time::sleep(interval) => {}
                }

                match Self::query_status(gateway.as_ref(), &session_name).await {
                    Ok(status) => {
                        let _ = tx.send(status);
                        if status.is_authenticated() {
                            info!(instance_id, "session authenticated; QR flow complete");
                            authenticated = true;
                            break;
                        }
                        debug!(instance_id, status = %status, attempt, "awaiting authentication");
                    }
                    Err(e) => {
                        warn!(instance_id, error = %e, attempt, "status poll failed; continuing");
                    }
                }
            }

            if !authenticated && !cancel.is_cancelled() {
                warn!(instance_id, max_attempts, "QR flow retired without authentication");
            }

            // A cancelled token means a newer flow owns the registry entry
            // (or abandon already removed it); leave it alone.
            if !cancel.is_cancelled() {
                polls.lock().await.remove(&instance_id);
            }
        });

        rx
    }
}
