// SPDX-FileCopyrightText: 2026 Palanque Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `palanque serve` command implementation.
//!
//! Wires the SQLite store and WAHA gateway factory into the dispatch
//! worker, arms the recurring tick, and runs until SIGINT/SIGTERM.

use std::sync::Arc;

use tracing::info;

use palanque_config::model::PalanqueConfig;
use palanque_core::PalanqueError;
use palanque_dispatch::{DispatchWorker, Dispatcher, shutdown};
use palanque_storage::SqliteStore;
use palanque_waha::WahaGatewayFactory;

/// Runs the dispatch service until a shutdown signal arrives.
pub async fn run_serve(config: PalanqueConfig) -> Result<(), PalanqueError> {
    info!("starting palanque serve");

    let store = Arc::new(SqliteStore::new(config.storage.clone()));
    store.initialize().await?;

    let gateways = Arc::new(WahaGatewayFactory::new(&config.gateway));

    let worker = Arc::new(DispatchWorker::new(
        store.clone(),
        gateways,
        &config.dispatch,
        config.delivery.clone(),
    ));
    let mut dispatcher = Dispatcher::new(worker, &config.dispatch);
    dispatcher.start();

    let cancel = shutdown::install_signal_handler();
    cancel.cancelled().await;

    dispatcher.stop().await;
    store.close().await?;

    info!("palanque serve stopped");
    Ok(())
}
