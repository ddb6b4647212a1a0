//! Integration Test: /ws/alerts WebSocket
//!
//! 実サーバーを起動し、ラウンドで発生したアラートがWebSocketで届くことを確認する。

use crate::support::{mount_service, UNREACHABLE_URL};
use apimon::alert::create_shared_alert_bus;
use apimon::api;
use apimon::common::types::ServiceDescriptor;
use apimon::registry::MonitorRegistry;
use apimon::shutdown::ShutdownController;
use apimon::AppState;
use futures::StreamExt;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};
use wiremock::MockServer;

async fn start_server(state: AppState) -> SocketAddr {
    let app = api::create_app(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    addr
}

fn build_state() -> AppState {
    let alert_bus = create_shared_alert_bus();
    let registry =
        MonitorRegistry::new(reqwest::Client::new(), alert_bus.clone(), Duration::from_secs(2));
    AppState {
        registry,
        alert_bus,
        shutdown: ShutdownController::default(),
    }
}

async fn next_json<S>(read: &mut S) -> serde_json::Value
where
    S: futures::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    let msg = tokio::time::timeout(Duration::from_secs(5), read.next())
        .await
        .expect("Timeout waiting for message")
        .expect("No message received")
        .expect("Message error");

    if let Message::Text(text) = msg {
        serde_json::from_str(&text).expect("Invalid JSON")
    } else {
        panic!("Expected text message, got {:?}", msg);
    }
}

#[tokio::test]
async fn test_alerts_ws_sends_welcome() {
    let addr = start_server(build_state()).await;

    let (ws_stream, _) = connect_async(format!("ws://{}/ws/alerts", addr))
        .await
        .expect("Failed to connect to WebSocket");
    let (_write, mut read) = ws_stream.split();

    let json = next_json(&mut read).await;
    assert_eq!(json["type"], "connected");
}

#[tokio::test]
async fn test_alerts_ws_streams_round_alerts() {
    let target = MockServer::start().await;
    mount_service(&target, "/slow", 200, Duration::from_millis(120)).await;

    let state = build_state();
    state
        .registry
        .register(ServiceDescriptor::new(
            "Service A",
            format!("{}/slow", target.uri()),
            Duration::from_secs(30),
            Duration::from_millis(50),
        ))
        .await
        .unwrap();
    state
        .registry
        .register(ServiceDescriptor::new(
            "Service B",
            UNREACHABLE_URL,
            Duration::from_secs(60),
            Duration::from_millis(500),
        ))
        .await
        .unwrap();

    let addr = start_server(state.clone()).await;
    let (ws_stream, _) = connect_async(format!("ws://{}/ws/alerts", addr))
        .await
        .expect("Failed to connect to WebSocket");
    let (_write, mut read) = ws_stream.split();

    // Skip the initial "connected" message
    let _ = next_json(&mut read).await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/monitor", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let mut received = vec![next_json(&mut read).await, next_json(&mut read).await];
    received.sort_by_key(|event| event["data"]["service"].as_str().unwrap_or("").to_string());

    assert_eq!(received[0]["type"], "ThresholdExceeded");
    assert_eq!(received[0]["data"]["service"], "Service A");
    assert_eq!(received[0]["data"]["threshold_ms"], 50);

    assert_eq!(received[1]["type"], "ExecutionFailure");
    assert_eq!(received[1]["data"]["service"], "Service B");
}
