// SPDX-FileCopyrightText: 2026 Palanque Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chunked delivery with simulated typing cadence.
//!
//! One logical message is delivered as a sequence of sentence-level sends,
//! each preceded by a typing indicator held for a length-proportional
//! duration. Typing and mark-seen failures are logged and swallowed; send
//! failures propagate so the worker can roll back the dedup hash.

use std::time::Duration;

use tracing::{debug, warn};

use palanque_config::model::DeliveryConfig;
use palanque_core::{PalanqueError, WhatsAppGateway};

/// Deterministic chat id for a phone number: digits only, `@c.us` suffix.
pub fn chat_id_for_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    format!("{digits}@c.us")
}

/// Splits text into sentence chunks.
///
/// A boundary is a `.` or `?` immediately followed by whitespace; the
/// boundary character is dropped and the whitespace consumed. `!` does not
/// split. Trailing punctuation with no following whitespace stays attached
/// to the final chunk.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if (c == '.' || c == '?') && chars.peek().is_some_and(|n| n.is_whitespace()) {
            let chunk = current.trim();
            if !chunk.is_empty() {
                chunks.push(chunk.to_string());
            }
            current.clear();
            while chars.peek().is_some_and(|n| n.is_whitespace()) {
                chars.next();
            }
        } else {
            current.push(c);
        }
    }

    let chunk = current.trim();
    if !chunk.is_empty() {
        chunks.push(chunk.to_string());
    }
    chunks
}

/// Strips a single trailing period, the reference style normalization.
pub fn strip_trailing_period(chunk: &str) -> &str {
    chunk.strip_suffix('.').unwrap_or(chunk)
}

/// Typing duration for a chunk of `len` characters, clamped so short chunks
/// still read as typed and long ones do not stall the conversation.
pub fn typing_duration(len: usize, config: &DeliveryConfig) -> Duration {
    let ms = (len as u64)
        .saturating_mul(config.typing_ms_per_char)
        .clamp(config.typing_min_ms, config.typing_max_ms);
    Duration::from_millis(ms)
}

/// Sends one logical message as human-paced sentence chunks.
pub struct DeliveryEngine {
    config: DeliveryConfig,
}

impl DeliveryEngine {
    pub fn new(config: DeliveryConfig) -> Self {
        Self { config }
    }

    /// Delivers `text` to `phone` through the given gateway.
    ///
    /// Chunks go out strictly in order; the typing indicator is stopped on
    /// every exit path of the typing block, including a failed start. Only
    /// `send_text` failures propagate.
    pub async fn deliver(
        &self,
        gateway: &dyn WhatsAppGateway,
        phone: &str,
        text: &str,
    ) -> Result<(), PalanqueError> {
        let chat_id = chat_id_for_phone(phone);

        if let Err(e) = gateway.mark_seen(&chat_id).await {
            debug!(chat = %chat_id, error = %e, "mark seen failed; continuing");
        }

        let chunks = split_sentences(text);
        let last = chunks.len().saturating_sub(1);

        for (i, chunk) in chunks.iter().enumerate() {
            let chunk = strip_trailing_period(chunk);
            let duration = typing_duration(chunk.chars().count(), &self.config);

            if let Err(e) = gateway.start_typing(&chat_id).await {
                warn!(chat = %chat_id, error = %e, "typing start failed");
            }
            tokio::time::sleep(duration).await;
            if let Err(e) = gateway.stop_typing(&chat_id).await {
                warn!(chat = %chat_id, error = %e, "typing stop failed");
            }

            gateway.send_text(&chat_id, chunk).await?;
            debug!(chat = %chat_id, chunk = i + 1, total = chunks.len(), "chunk sent");

            if i < last {
                tokio::time::sleep(Duration::from_millis(self.config.inter_chunk_delay_ms)).await;
            }
        }

        Ok(())
    }
}
