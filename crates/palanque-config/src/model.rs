// SPDX-FileCopyrightText: 2026 Palanque Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Palanque dispatch service.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use serde::{Deserialize, Serialize};

/// Top-level Palanque configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PalanqueConfig {
    /// Service identity and logging settings.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// WhatsApp gateway client settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Scheduled dispatch worker settings.
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Session lifecycle and QR authentication settings.
    #[serde(default)]
    pub session: SessionConfig,

    /// Chunked delivery pacing settings.
    #[serde(default)]
    pub delivery: DeliveryConfig,
}

/// Service identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Display name of the service.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "palanque".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("palanque").join("palanque.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("palanque.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// WhatsApp gateway client configuration.
///
/// Per-instance credentials (base URL, API key, session name) live in the
/// database; this section only carries client-wide settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// HTTP request timeout in seconds for all gateway calls.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Scheduled dispatch worker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DispatchConfig {
    /// Seconds between dispatch passes.
    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: u64,

    /// Seconds a message id stays suppressed after the alternate queue
    /// path reports having sent it.
    #[serde(default = "default_suppression_window_secs")]
    pub suppression_window_secs: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: default_tick_interval_secs(),
            suppression_window_secs: default_suppression_window_secs(),
        }
    }
}

fn default_tick_interval_secs() -> u64 {
    10
}

fn default_suppression_window_secs() -> u64 {
    60
}

/// Session lifecycle and QR authentication configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Seconds between status polls while waiting for QR authentication.
    #[serde(default = "default_qr_poll_interval_secs")]
    pub qr_poll_interval_secs: u64,

    /// Maximum number of status polls before the QR flow is retired.
    #[serde(default = "default_qr_poll_max_attempts")]
    pub qr_poll_max_attempts: u32,

    /// Milliseconds to wait after a session start or logout before the
    /// gateway is ready for the next call.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            qr_poll_interval_secs: default_qr_poll_interval_secs(),
            qr_poll_max_attempts: default_qr_poll_max_attempts(),
            settle_delay_ms: default_settle_delay_ms(),
        }
    }
}

fn default_qr_poll_interval_secs() -> u64 {
    5
}

fn default_qr_poll_max_attempts() -> u32 {
    60
}

fn default_settle_delay_ms() -> u64 {
    3000
}

/// Chunked delivery pacing configuration.
///
/// Typing duration is `chunk length * typing_ms_per_char`, clamped to
/// `[typing_min_ms, typing_max_ms]`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DeliveryConfig {
    /// Simulated typing speed in milliseconds per character.
    #[serde(default = "default_typing_ms_per_char")]
    pub typing_ms_per_char: u64,

    /// Lower bound on the simulated typing duration, in milliseconds.
    #[serde(default = "default_typing_min_ms")]
    pub typing_min_ms: u64,

    /// Upper bound on the simulated typing duration, in milliseconds.
    #[serde(default = "default_typing_max_ms")]
    pub typing_max_ms: u64,

    /// Pause between consecutive chunks of one message, in milliseconds.
    #[serde(default = "default_inter_chunk_delay_ms")]
    pub inter_chunk_delay_ms: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            typing_ms_per_char: default_typing_ms_per_char(),
            typing_min_ms: default_typing_min_ms(),
            typing_max_ms: default_typing_max_ms(),
            inter_chunk_delay_ms: default_inter_chunk_delay_ms(),
        }
    }
}

fn default_typing_ms_per_char() -> u64 {
    60
}

fn default_typing_min_ms() -> u64 {
    2000
}

fn default_typing_max_ms() -> u64 {
    6000
}

fn default_inter_chunk_delay_ms() -> u64 {
    1500
}
