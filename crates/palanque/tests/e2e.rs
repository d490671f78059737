// SPDX-FileCopyrightText: 2026 Palanque Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the dispatch pipeline: real SQLite store, real
//! gateway client, mock gateway HTTP server.
//!
//! Each test creates an isolated temp database and wiremock server. The
//! delivery pacing is tightened so simulated typing does not slow the
//! suite down.

use std::sync::Arc;

use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use palanque_config::model::{DeliveryConfig, DispatchConfig, GatewayConfig, StorageConfig};
use palanque_core::DispatchStore;
use palanque_dispatch::DispatchWorker;
use palanque_storage::SqliteStore;
use palanque_waha::WahaGatewayFactory;

struct TestRig {
    server: MockServer,
    store: Arc<SqliteStore>,
    worker: DispatchWorker,
    _dir: tempfile::TempDir,
}

async fn rig() -> TestRig {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("e2e.db");
    let store = Arc::new(SqliteStore::new(StorageConfig {
        database_path: db_path.to_str().unwrap().to_string(),
        wal_mode: true,
    }));
    store.initialize().await.unwrap();

    let server = MockServer::start().await;

    // Typing simulation pared down to keep the suite fast.
    let delivery = DeliveryConfig {
        typing_ms_per_char: 1,
        typing_min_ms: 5,
        typing_max_ms: 20,
        inter_chunk_delay_ms: 5,
    };

    let worker = DispatchWorker::new(
        store.clone(),
        Arc::new(WahaGatewayFactory::new(&GatewayConfig::default())),
        &DispatchConfig::default(),
        delivery,
    );

    TestRig {
        server,
        store,
        worker,
        _dir: dir,
    }
}

/// Mounts 200 responses for the non-critical side-effect calls.
async fn mount_side_effects(server: &MockServer) {
    for endpoint in ["/api/sendSeen", "/api/startTyping", "/api/stopTyping"] {
        Mock::given(method("POST"))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(200))
            .mount(server)
            .await;
    }
}

async fn seed_instance(rig: &TestRig) -> i64 {
    rig.store
        .create_instance(&rig.server.uri(), "e2e-key", "campaign-01")
        .await
        .unwrap()
}

#[tokio::test]
async fn scheduled_message_is_chunked_and_delivered() {
    let rig = rig().await;
    mount_side_effects(&rig.server).await;

    Mock::given(method("POST"))
        .and(path("/api/sendText"))
        .and(body_json(serde_json::json!({
            "session": "campaign-01",
            "chatId": "5511999990000@c.us",
            "text": "Olá! Como vai"
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&rig.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/sendText"))
        .and(body_json(serde_json::json!({
            "session": "campaign-01",
            "chatId": "5511999990000@c.us",
            "text": "Obrigado pelo contato"
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&rig.server)
        .await;

    let instance_id = seed_instance(&rig).await;
    let message_id = rig
        .store
        .schedule_message(
            instance_id,
            "5511999990000",
            Some("Olá! Como vai? Obrigado pelo contato."),
            "2020-01-01T00:00:00.000Z",
        )
        .await
        .unwrap();

    rig.worker.tick().await;

    let message = rig.store.message(message_id).await.unwrap().unwrap();
    assert!(message.sent, "message should be marked sent");
    assert!(message.sent_at.is_some());
    assert!(rig.store.due_messages().await.unwrap().is_empty());
}

#[tokio::test]
async fn identical_messages_in_one_pass_produce_a_single_send() {
    let rig = rig().await;
    mount_side_effects(&rig.server).await;

    Mock::given(method("POST"))
        .and(path("/api/sendText"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&rig.server)
        .await;

    let instance_id = seed_instance(&rig).await;
    let first = rig
        .store
        .schedule_message(
            instance_id,
            "5511999990000",
            Some("Bom dia"),
            "2020-01-01T00:00:00.000Z",
        )
        .await
        .unwrap();
    let second = rig
        .store
        .schedule_message(
            instance_id,
            "5511999990000",
            Some("Bom dia"),
            "2020-01-01T00:00:01.000Z",
        )
        .await
        .unwrap();

    rig.worker.tick().await;

    // The duplicate observes the reserved hash and is collapsed: marked
    // sent with no second provider call (wiremock verifies expect(1)).
    assert!(rig.store.message(first).await.unwrap().unwrap().sent);
    assert!(rig.store.message(second).await.unwrap().unwrap().sent);
}

#[tokio::test]
async fn failed_send_rolls_back_and_succeeds_on_the_next_pass() {
    let rig = rig().await;
    mount_side_effects(&rig.server).await;

    // First attempt fails at the gateway, the retry succeeds.
    Mock::given(method("POST"))
        .and(path("/api/sendText"))
        .respond_with(ResponseTemplate::new(500).set_body_string("engine restarting"))
        .up_to_n_times(1)
        .mount(&rig.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/sendText"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&rig.server)
        .await;

    let instance_id = seed_instance(&rig).await;
    let message_id = rig
        .store
        .schedule_message(
            instance_id,
            "5511999990000",
            Some("Bom dia"),
            "2020-01-01T00:00:00.000Z",
        )
        .await
        .unwrap();

    rig.worker.tick().await;
    let message = rig.store.message(message_id).await.unwrap().unwrap();
    assert!(!message.sent, "failed delivery stays unsent");

    // The reservation was rolled back, so the next pass retries within the
    // same minute window and succeeds.
    rig.worker.tick().await;
    let message = rig.store.message(message_id).await.unwrap().unwrap();
    assert!(message.sent);
}

#[tokio::test]
async fn inactive_instance_suppresses_dispatch_entirely() {
    let rig = rig().await;

    Mock::given(method("POST"))
        .and(path("/api/sendText"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&rig.server)
        .await;

    let instance_id = seed_instance(&rig).await;
    rig.store
        .set_instance_active(instance_id, false)
        .await
        .unwrap();
    let message_id = rig
        .store
        .schedule_message(
            instance_id,
            "5511999990000",
            Some("Bom dia"),
            "2020-01-01T00:00:00.000Z",
        )
        .await
        .unwrap();

    rig.worker.tick().await;

    assert!(!rig.store.message(message_id).await.unwrap().unwrap().sent);
}
