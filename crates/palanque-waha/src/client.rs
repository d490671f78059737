// SPDX-FileCopyrightText: 2026 Palanque Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the WAHA-style WhatsApp gateway.
//!
//! Provides [`WahaClient`], one instance per configured gateway session,
//! handling authentication headers, request construction and error mapping.
//! There is deliberately no HTTP-level retry: `sendText` is not idempotent,
//! and the dispatch worker's hash rollback already provides retry on the
//! next tick.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::debug;

use palanque_core::{PalanqueError, SessionInfo, WhatsAppGateway};

use crate::types::{ChatRequest, QrDto, SendTextRequest, SessionDto};

/// HTTP client bound to one gateway session.
///
/// All calls carry the instance's `X-Api-Key` header and share a pooled
/// connection.
#[derive(Debug, Clone)]
pub struct WahaClient {
    client: reqwest::Client,
    base_url: String,
    session: String,
}

impl WahaClient {
    /// Creates a new gateway client.
    ///
    /// # Arguments
    /// * `base_url` - gateway root, e.g. `http://localhost:3000`
    /// * `api_key` - value for the `X-Api-Key` header
    /// * `session` - gateway-side session name
    /// * `timeout` - per-request timeout
    pub fn new(
        base_url: &str,
        api_key: &str,
        session: &str,
        timeout: Duration,
    ) -> Result<Self, PalanqueError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(api_key).map_err(|e| {
                PalanqueError::Config(format!("invalid API key header value: {e}"))
            })?,
        );
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| PalanqueError::Gateway {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session: session.to_string(),
        })
    }

    /// Returns the session name this client is bound to.
    pub fn session(&self) -> &str {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Sends a request and maps transport failures and non-success statuses
    /// into [`PalanqueError::Gateway`], with the response body preserved for
    /// the operator log.
    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
        what: &str,
    ) -> Result<reqwest::Response, PalanqueError> {
        let response = request.send().await.map_err(|e| PalanqueError::Gateway {
            message: format!("{what} request failed: {e}"),
            source: Some(Box::new(e)),
        })?;

        let status = response.status();
        debug!(status = %status, call = what, "gateway response");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(PalanqueError::Gateway {
            message: format!("{what} returned {status}: {body}"),
            source: None,
        })
    }

    async fn post_session_action(&self, action: &str) -> Result<(), PalanqueError> {
        let url = self.url(&format!("/api/sessions/{}/{action}", self.session));
        self.execute(self.client.post(&url), action).await?;
        Ok(())
    }
}

#[async_trait]
impl WhatsAppGateway for WahaClient {
    async fn list_sessions(&self) -> Result<Vec<SessionInfo>, PalanqueError> {
        let url = self.url("/api/sessions");
        let response = self.execute(self.client.get(&url), "sessions").await?;
        let sessions: Vec<SessionDto> =
            response.json().await.map_err(|e| PalanqueError::Gateway {
                message: format!("failed to parse session listing: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(sessions
            .into_iter()
            .map(|s| SessionInfo {
                name: s.name,
                status: s.status,
            })
            .collect())
    }

    async fn start_session(&self) -> Result<(), PalanqueError> {
        self.post_session_action("start").await
    }

    async fn stop_session(&self) -> Result<(), PalanqueError> {
        self.post_session_action("stop").await
    }

    async fn logout_session(&self) -> Result<(), PalanqueError> {
        self.post_session_action("logout").await
    }

    async fn qr_code(&self) -> Result<String, PalanqueError> {
        let url = self.url(&format!("/api/{}/auth/qr?format=raw", self.session));
        let response = self.execute(self.client.get(&url), "qr").await?;
        let qr: QrDto = response.json().await.map_err(|e| PalanqueError::Gateway {
            message: format!("failed to parse QR payload: {e}"),
            source: Some(Box::new(e)),
        })?;
        Ok(qr.value)
    }

    async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), PalanqueError> {
        let url = self.url("/api/sendText");
        let body = SendTextRequest {
            session: &self.session,
            chat_id,
            text,
        };
        self.execute(self.client.post(&url).json(&body), "sendText")
            .await?;
        Ok(())
    }

    async fn start_typing(&self, chat_id: &str) -> Result<(), PalanqueError> {
        let url = self.url("/api/startTyping");
        let body = ChatRequest {
            session: &self.session,
            chat_id,
        };
        self.execute(self.client.post(&url).json(&body), "startTyping")
            .await?;
        Ok(())
    }

    async fn stop_typing(&self, chat_id: &str) -> Result<(), PalanqueError> {
        let url = self.url("/api/stopTyping");
        let body = ChatRequest {
            session: &self.session,
            chat_id,
        };
        self.execute(self.client.post(&url).json(&body), "stopTyping")
            .await?;
        Ok(())
    }

    async fn mark_seen(&self, chat_id: &str) -> Result<(), PalanqueError> {
        let url = self.url("/api/sendSeen");
        let body = ChatRequest {
            session: &self.session,
            chat_id,
        };
        self.execute(self.client.post(&url).json(&body), "sendSeen")
            .await?;
        Ok(())
    }
}
