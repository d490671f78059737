// SPDX-FileCopyrightText: 2026 Palanque Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the dispatch subsystem.
//!
//! Timestamps are RFC 3339 strings throughout, matching how the storage
//! layer persists them.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Current UTC instant formatted the way the storage layer stores and
/// compares timestamps (`YYYY-MM-DDTHH:MM:SS.sssZ`, the SQLite
/// `strftime('%Y-%m-%dT%H:%M:%fZ','now')` shape).
pub fn timestamp_now() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// One configured WhatsApp gateway session.
///
/// Created and edited by configuration tooling; the dispatch core treats
/// instances as read-only. Deactivating an instance suppresses dispatch of
/// its messages without deleting them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInstance {
    pub id: i64,
    /// Base URL of the gateway, e.g. `http://localhost:3000`.
    pub base_url: String,
    /// API key sent as the `X-Api-Key` header.
    pub api_key: String,
    /// Gateway-side session name this instance authenticates as.
    pub session_name: String,
    pub active: bool,
}

/// A unit of outbound work: one generated response scheduled for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledMessage {
    pub id: i64,
    /// The [`ProviderInstance`] that owns this message's session.
    pub instance_id: i64,
    pub phone_number: String,
    /// Generated response text. `None` means the generation pipeline has
    /// not produced output yet; such messages are skipped, not retried.
    pub response_text: Option<String>,
    /// RFC 3339 instant after which the message becomes eligible.
    pub scheduled_at: String,
    /// Monotonic: once set, never reverts.
    pub sent: bool,
    pub sent_at: Option<String>,
}

/// Gateway-reported authentication state of a session.
///
/// `Stopped` and `Working` are the only stable resting states; `Starting`
/// and `ScanQrCode` are transient and resolve via polling. Any state may
/// fall to `Failed` on an unrecoverable gateway error, which requires an
/// operator-initiated reconnect.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Stopped,
    Starting,
    ScanQrCode,
    Working,
    Failed,
}

impl SessionStatus {
    /// Whether the session is in a stable resting state.
    pub fn is_resting(self) -> bool {
        matches!(self, SessionStatus::Stopped | SessionStatus::Working)
    }

    /// Whether the session is authenticated and able to send.
    pub fn is_authenticated(self) -> bool {
        self == SessionStatus::Working
    }
}

/// One entry of the gateway's session listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub name: String,
    pub status: SessionStatus,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn session_status_uses_gateway_wire_strings() {
        let variants = [
            (SessionStatus::Stopped, "STOPPED"),
            (SessionStatus::Starting, "STARTING"),
            (SessionStatus::ScanQrCode, "SCAN_QR_CODE"),
            (SessionStatus::Working, "WORKING"),
            (SessionStatus::Failed, "FAILED"),
        ];

        for (variant, wire) in variants {
            assert_eq!(variant.to_string(), wire);
            assert_eq!(SessionStatus::from_str(wire).unwrap(), variant);

            let json = serde_json::to_string(&variant).unwrap();
            assert_eq!(json, format!("\"{wire}\""));
            let parsed: SessionStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, variant);
        }
    }

    #[test]
    fn resting_states_are_stopped_and_working() {
        assert!(SessionStatus::Stopped.is_resting());
        assert!(SessionStatus::Working.is_resting());
        assert!(!SessionStatus::Starting.is_resting());
        assert!(!SessionStatus::ScanQrCode.is_resting());
        assert!(!SessionStatus::Failed.is_resting());
    }

    #[test]
    fn timestamp_now_matches_storage_shape() {
        let ts = timestamp_now();
        // e.g. 2026-08-07T14:03:22.123Z
        assert_eq!(ts.len(), 24, "got: {ts}");
        assert!(ts.ends_with('Z'));
        assert_eq!(&ts[10..11], "T");
    }

    #[test]
    fn only_working_is_authenticated() {
        assert!(SessionStatus::Working.is_authenticated());
        assert!(!SessionStatus::ScanQrCode.is_authenticated());
    }
}
