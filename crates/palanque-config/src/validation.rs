// SPDX-FileCopyrightText: 2026 Palanque Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as non-empty paths and interval ranges.

use crate::diagnostic::ConfigError;
use crate::model::PalanqueConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &PalanqueConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.gateway.request_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "gateway.request_timeout_secs must be at least 1".to_string(),
        });
    }

    if config.dispatch.tick_interval_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "dispatch.tick_interval_secs must be at least 1".to_string(),
        });
    }

    if config.dispatch.suppression_window_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "dispatch.suppression_window_secs must be at least 1".to_string(),
        });
    }

    if config.session.qr_poll_interval_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "session.qr_poll_interval_secs must be at least 1".to_string(),
        });
    }

    if config.session.qr_poll_max_attempts == 0 {
        errors.push(ConfigError::Validation {
            message: "session.qr_poll_max_attempts must be at least 1".to_string(),
        });
    }

    if config.delivery.typing_min_ms > config.delivery.typing_max_ms {
        errors.push(ConfigError::Validation {
            message: format!(
                "delivery.typing_min_ms ({}) must not exceed delivery.typing_max_ms ({})",
                config.delivery.typing_min_ms, config.delivery.typing_max_ms
            ),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
