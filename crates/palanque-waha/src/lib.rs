// SPDX-FileCopyrightText: 2026 Palanque Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WAHA-style WhatsApp gateway client for the Palanque dispatch service.
//!
//! Implements [`WhatsAppGateway`] over the provider's HTTP API: session
//! lifecycle (`/api/sessions/{name}/...`), QR retrieval, and the messaging
//! surface (`sendText`, `startTyping`, `stopTyping`, `sendSeen`).

pub mod client;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use palanque_config::model::GatewayConfig;
use palanque_core::{GatewayFactory, PalanqueError, ProviderInstance, WhatsAppGateway};

pub use client::WahaClient;

/// Builds a [`WahaClient`] per provider instance.
///
/// Each instance carries its own base URL, API key and session name; the
/// factory only contributes client-wide settings from configuration.
#[derive(Debug, Clone)]
pub struct WahaGatewayFactory {
    timeout: Duration,
}

impl WahaGatewayFactory {
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }
}

impl GatewayFactory for WahaGatewayFactory {
    fn create(
        &self,
        instance: &ProviderInstance,
    ) -> Result<Arc<dyn WhatsAppGateway>, PalanqueError> {
        let client = WahaClient::new(
            &instance.base_url,
            &instance.api_key,
            &instance.session_name,
            self.timeout,
        )?;
        Ok(Arc::new(client))
    }
}
