// SPDX-FileCopyrightText: 2026 Palanque Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway trait for the third-party WhatsApp HTTP provider.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::PalanqueError;
use crate::types::{ProviderInstance, SessionInfo};

/// One authenticated connection to the WhatsApp gateway, bound to a single
/// session name.
///
/// Every method is a thin wrapper over one provider HTTP call. Methods
/// return `Ok(())` on a success response and a
/// [`Gateway`](PalanqueError::Gateway) error otherwise; callers decide
/// which failures are critical.
#[async_trait]
pub trait WhatsAppGateway: Send + Sync {
    /// Lists all sessions known to the gateway with their current status.
    async fn list_sessions(&self) -> Result<Vec<SessionInfo>, PalanqueError>;

    /// Starts this client's session on the gateway.
    async fn start_session(&self) -> Result<(), PalanqueError>;

    /// Stops this client's session.
    async fn stop_session(&self) -> Result<(), PalanqueError>;

    /// Logs this client's session out of the linked WhatsApp account.
    async fn logout_session(&self) -> Result<(), PalanqueError>;

    /// Fetches the current QR payload for pairing.
    ///
    /// Only meaningful while the session is in `SCAN_QR_CODE`.
    async fn qr_code(&self) -> Result<String, PalanqueError>;

    /// Sends a single text message to the given chat.
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), PalanqueError>;

    /// Shows the typing indicator in the given chat.
    async fn start_typing(&self, chat_id: &str) -> Result<(), PalanqueError>;

    /// Clears the typing indicator in the given chat.
    async fn stop_typing(&self, chat_id: &str) -> Result<(), PalanqueError>;

    /// Marks the conversation as seen.
    async fn mark_seen(&self, chat_id: &str) -> Result<(), PalanqueError>;
}

/// Builds a [`WhatsAppGateway`] client for a provider instance.
///
/// Each [`ProviderInstance`] carries its own base URL, API key and session
/// name, so the dispatch worker constructs a client per message batch item
/// through this seam.
pub trait GatewayFactory: Send + Sync {
    fn create(
        &self,
        instance: &ProviderInstance,
    ) -> Result<Arc<dyn WhatsAppGateway>, PalanqueError>;
}
