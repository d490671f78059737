// SPDX-FileCopyrightText: 2026 Palanque Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock WhatsApp gateway for deterministic testing.
//!
//! `MockGateway` implements `WhatsAppGateway` with an ordered call log,
//! a scripted status sequence, and injectable failures and latency.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use palanque_core::{
    GatewayFactory, PalanqueError, ProviderInstance, SessionInfo, SessionStatus, WhatsAppGateway,
};

/// One recorded gateway call, in invocation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    ListSessions,
    StartSession,
    StopSession,
    LogoutSession,
    QrCode,
    SendText { chat_id: String, text: String },
    StartTyping(String),
    StopTyping(String),
    MarkSeen(String),
}

#[derive(Default)]
struct Behavior {
    /// Statuses returned by successive `list_sessions` calls; the last one
    /// repeats once the script is exhausted. Empty means "session unknown".
    statuses: VecDeque<SessionStatus>,
    qr_value: String,
    fail_sends_remaining: u32,
    fail_start: bool,
    fail_typing_start: bool,
    fail_logout: bool,
    fail_mark_seen: bool,
    send_delay: Option<Duration>,
}

/// A scripted gateway double.
pub struct MockGateway {
    session_name: String,
    calls: Mutex<Vec<GatewayCall>>,
    behavior: Mutex<Behavior>,
}

impl MockGateway {
    pub fn new(session_name: &str) -> Self {
        Self {
            session_name: session_name.to_string(),
            calls: Mutex::new(Vec::new()),
            behavior: Mutex::new(Behavior {
                qr_value: "mock-qr-payload".to_string(),
                ..Behavior::default()
            }),
        }
    }

    /// Script the statuses reported by successive `list_sessions` calls.
    pub async fn set_statuses(&self, statuses: Vec<SessionStatus>) {
        self.behavior.lock().await.statuses = statuses.into();
    }

    pub async fn set_qr_value(&self, value: &str) {
        self.behavior.lock().await.qr_value = value.to_string();
    }

    /// Make the next `n` `send_text` calls fail.
    pub async fn fail_next_sends(&self, n: u32) {
        self.behavior.lock().await.fail_sends_remaining = n;
    }

    pub async fn set_fail_start(&self, fail: bool) {
        self.behavior.lock().await.fail_start = fail;
    }

    pub async fn set_fail_typing_start(&self, fail: bool) {
        self.behavior.lock().await.fail_typing_start = fail;
    }

    pub async fn set_fail_logout(&self, fail: bool) {
        self.behavior.lock().await.fail_logout = fail;
    }

    pub async fn set_fail_mark_seen(&self, fail: bool) {
        self.behavior.lock().await.fail_mark_seen = fail;
    }

    /// Delay every `send_text` by `delay` (drives reentrancy tests).
    pub async fn set_send_delay(&self, delay: Duration) {
        self.behavior.lock().await.send_delay = Some(delay);
    }

    /// All calls recorded so far, in order.
    pub async fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().await.clone()
    }

    /// The text payloads passed to `send_text`, in order.
    pub async fn sent_texts(&self) -> Vec<String> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|c| match c {
                GatewayCall::SendText { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub async fn clear_calls(&self) {
        self.calls.lock().await.clear();
    }

    async fn record(&self, call: GatewayCall) {
        self.calls.lock().await.push(call);
    }

    fn gateway_err(what: &str) -> PalanqueError {
        PalanqueError::Gateway {
            message: format!("mock {what} failure"),
            source: None,
        }
    }
}

#[async_trait]
impl WhatsAppGateway for MockGateway {
    async fn list_sessions(&self) -> Result<Vec<SessionInfo>, PalanqueError> {
        self.record(GatewayCall::ListSessions).await;
        let mut behavior = self.behavior.lock().await;
        let status = if behavior.statuses.len() > 1 {
            behavior.statuses.pop_front()
        } else {
            behavior.statuses.front().copied()
        };
        Ok(status
            .map(|status| {
                vec![SessionInfo {
                    name: self.session_name.clone(),
                    status,
                }]
            })
            .unwrap_or_default())
    }

    async fn start_session(&self) -> Result<(), PalanqueError> {
        self.record(GatewayCall::StartSession).await;
        if self.behavior.lock().await.fail_start {
            return Err(Self::gateway_err("start"));
        }
        Ok(())
    }

    async fn stop_session(&self) -> Result<(), PalanqueError> {
        self.record(GatewayCall::StopSession).await;
        Ok(())
    }

    async fn logout_session(&self) -> Result<(), PalanqueError> {
        self.record(GatewayCall::LogoutSession).await;
        if self.behavior.lock().await.fail_logout {
            return Err(Self::gateway_err("logout"));
        }
        Ok(())
    }

    async fn qr_code(&self) -> Result<String, PalanqueError> {
        self.record(GatewayCall::QrCode).await;
        Ok(self.behavior.lock().await.qr_value.clone())
    }

    async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), PalanqueError> {
        self.record(GatewayCall::SendText {
            chat_id: chat_id.to_string(),
            text: text.to_string(),
        })
        .await;

        let delay = {
            let mut behavior = self.behavior.lock().await;
            if behavior.fail_sends_remaining > 0 {
                behavior.fail_sends_remaining -= 1;
                return Err(Self::gateway_err("sendText"));
            }
            behavior.send_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    async fn start_typing(&self, chat_id: &str) -> Result<(), PalanqueError> {
        self.record(GatewayCall::StartTyping(chat_id.to_string())).await;
        if self.behavior.lock().await.fail_typing_start {
            return Err(Self::gateway_err("startTyping"));
        }
        Ok(())
    }

    async fn stop_typing(&self, chat_id: &str) -> Result<(), PalanqueError> {
        self.record(GatewayCall::StopTyping(chat_id.to_string())).await;
        Ok(())
    }

    async fn mark_seen(&self, chat_id: &str) -> Result<(), PalanqueError> {
        self.record(GatewayCall::MarkSeen(chat_id.to_string())).await;
        if self.behavior.lock().await.fail_mark_seen {
            return Err(Self::gateway_err("sendSeen"));
        }
        Ok(())
    }
}

/// Hands every instance the same shared [`MockGateway`].
pub struct MockGatewayFactory {
    gateway: Arc<MockGateway>,
}

impl MockGatewayFactory {
    pub fn new(gateway: Arc<MockGateway>) -> Self {
        Self { gateway }
    }
}

impl GatewayFactory for MockGatewayFactory {
    fn create(
        &self,
        _instance: &ProviderInstance,
    ) -> Result<Arc<dyn WhatsAppGateway>, PalanqueError> {
        Ok(self.gateway.clone())
    }
}
