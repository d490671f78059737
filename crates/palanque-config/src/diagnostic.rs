// SPDX-FileCopyrightText: 2026 Palanque Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration errors rendered as miette diagnostics.
//!
//! Figment parse failures and validation failures are both collected into
//! [`ConfigError`] so startup can report every problem at once instead of
//! failing on the first.

use miette::Diagnostic;
use thiserror::Error;

/// A configuration error with diagnostic metadata for terminal rendering.
#[derive(Debug, Clone, Error, Diagnostic)]
pub enum ConfigError {
    /// A TOML parse or deserialization failure reported by Figment.
    #[error("{message}")]
    #[diagnostic(
        code(palanque::config::parse),
        help("check palanque.toml against the documented sections: service, storage, gateway, dispatch, session, delivery")
    )]
    Parse { message: String },

    /// A semantic constraint violated by an otherwise well-formed config.
    #[error("validation error: {message}")]
    #[diagnostic(code(palanque::config::validation))]
    Validation { message: String },
}

/// Convert a Figment error (which may aggregate several failures) into one
/// [`ConfigError`] per underlying problem.
pub fn figment_to_config_errors(err: figment::Error) -> Vec<ConfigError> {
    err.into_iter()
        .map(|e| ConfigError::Parse {
            message: e.to_string(),
        })
        .collect()
}

/// Render all collected errors to stderr via miette's fancy handler.
pub fn render_errors(errors: &[ConfigError]) {
    for error in errors {
        eprintln!("{:?}", miette::Report::new(error.clone()));
    }
}
