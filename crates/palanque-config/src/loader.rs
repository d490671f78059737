// SPDX-FileCopyrightText: 2026 Palanque Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./palanque.toml` > `~/.config/palanque/palanque.toml`
//! > `/etc/palanque/palanque.toml` with environment variable overrides via the
//! `PALANQUE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::PalanqueConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/palanque/palanque.toml` (system-wide)
/// 3. `~/.config/palanque/palanque.toml` (user XDG config)
/// 4. `./palanque.toml` (local directory)
/// 5. `PALANQUE_*` environment variables
pub fn load_config() -> Result<PalanqueConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PalanqueConfig::default()))
        .merge(Toml::file("/etc/palanque/palanque.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("palanque/palanque.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("palanque.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<PalanqueConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PalanqueConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<PalanqueConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PalanqueConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `PALANQUE_STORAGE_DATABASE_PATH` must
/// map to `storage.database_path`, not `storage.database.path`.
fn env_provider() -> Env {
    Env::prefixed("PALANQUE_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: PALANQUE_DISPATCH_TICK_INTERVAL_SECS -> "dispatch_tick_interval_secs"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("service_", "service.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("gateway_", "gateway.", 1)
            .replacen("dispatch_", "dispatch.", 1)
            .replacen("session_", "session.", 1)
            .replacen("delivery_", "delivery.", 1);
        mapped.into()
    })
}
