// SPDX-FileCopyrightText: 2026 Palanque Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Palanque dispatch service.

use thiserror::Error;

/// The primary error type used across the dispatch subsystem and its collaborators.
#[derive(Debug, Error)]
pub enum PalanqueError {
    /// Configuration errors (invalid TOML, missing required fields, out-of-range values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, constraint violation).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// WhatsApp gateway errors (connection failure, non-success HTTP status, bad payload).
    #[error("gateway error: {message}")]
    Gateway {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Session lifecycle errors (wrong session state, session not found, abandoned flow).
    #[error("session error: {0}")]
    Session(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
