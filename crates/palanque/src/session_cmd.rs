// SPDX-FileCopyrightText: 2026 Palanque Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator session commands: `connect`, `reconnect`, `status`.
//!
//! The terminal equivalent of the admin UI's session tab: renders the
//! pairing QR code and waits on the status poll until the gateway reports
//! the session authenticated.

use std::sync::Arc;

use qrcode::QrCode;
use qrcode::render::unicode;

use palanque_config::model::PalanqueConfig;
use palanque_core::{DispatchStore, PalanqueError, ProviderInstance};
use palanque_dispatch::SessionController;
use palanque_storage::SqliteStore;
use palanque_waha::WahaGatewayFactory;

async fn open_store(config: &PalanqueConfig) -> Result<Arc<SqliteStore>, PalanqueError> {
    let store = Arc::new(SqliteStore::new(config.storage.clone()));
    store.initialize().await?;
    Ok(store)
}

async fn require_instance(
    store: &SqliteStore,
    id: i64,
) -> Result<ProviderInstance, PalanqueError> {
    store
        .instance(id)
        .await?
        .ok_or_else(|| PalanqueError::Session(format!("provider instance {id} not found")))
}

/// Starts (or restarts) the session and blocks until it authenticates or
/// the QR flow retires.
pub async fn run_connect(
    config: PalanqueConfig,
    instance_id: i64,
    reconnect: bool,
) -> Result<(), PalanqueError> {
    let store = open_store(&config).await?;
    let instance = require_instance(&store, instance_id).await?;

    let gateways = Arc::new(WahaGatewayFactory::new(&config.gateway));
    let controller = SessionController::new(gateways, config.session.clone());

    let mut qr = if reconnect {
        controller.reconnect(&instance).await?
    } else {
        controller.connect(&instance).await?
    };

    println!("{}", render_qr(&qr.qr)?);
    println!("Scan the code with WhatsApp on the campaign phone (Linked devices).");

    let mut authenticated = qr.status.borrow().is_authenticated();
    while !authenticated && qr.status.changed().await.is_ok() {
        authenticated = qr.status.borrow().is_authenticated();
    }

    store.close().await?;

    if authenticated {
        println!("Session '{}' authenticated.", instance.session_name);
        Ok(())
    } else {
        Err(PalanqueError::Session(
            "authentication not completed; run connect again for a fresh code".into(),
        ))
    }
}

/// Prints session status for one or all instances.
pub async fn run_status(
    config: PalanqueConfig,
    instance_id: Option<i64>,
) -> Result<(), PalanqueError> {
    let store = open_store(&config).await?;
    let instances = match instance_id {
        Some(id) => vec![require_instance(&store, id).await?],
        None => store.list_instances().await?,
    };

    let gateways = Arc::new(WahaGatewayFactory::new(&config.gateway));
    let controller = SessionController::new(gateways, config.session.clone());

    for instance in &instances {
        let status = match controller.status(instance).await {
            Ok(status) => status.to_string(),
            Err(e) => format!("unreachable ({e})"),
        };
        let active = if instance.active { "active" } else { "inactive" };
        println!(
            "{:>4}  {:<24} {:<10} {}",
            instance.id, instance.session_name, active, status
        );
    }

    store.close().await?;
    Ok(())
}

fn render_qr(payload: &str) -> Result<String, PalanqueError> {
    let code = QrCode::new(payload.as_bytes())
        .map_err(|e| PalanqueError::Session(format!("cannot render QR payload: {e}")))?;
    Ok(code
        .render::<unicode::Dense1x2>()
        .dark_color(unicode::Dense1x2::Light)
        .light_color(unicode::Dense1x2::Dark)
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_qr_produces_terminal_blocks() {
        let rendered = render_qr("2@abcdef==,xyz").unwrap();
        assert!(!rendered.is_empty());
        // Dense1x2 renders with half-block glyphs.
        assert!(rendered.chars().any(|c| c == '█' || c == '▀' || c == '▄'));
    }
}
