//! WebSocket endpoint for real-time alert events
//!
//! This module provides `/ws/alerts` endpoint that streams
//! AlertEvents to connected clients as they are raised.

use axum::extract::ws::{Message, WebSocket};
use axum::{
    extract::{State, WebSocketUpgrade},
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use tracing::{debug, warn};

use crate::alert::SharedAlertBus;
use crate::AppState;

/// WebSocket upgrade handler for alert events
pub async fn alerts_ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.alert_bus.clone()))
}

async fn handle_socket(socket: WebSocket, alert_bus: SharedAlertBus) {
    let (mut sender, mut receiver) = socket.split();
    let mut event_rx = alert_bus.subscribe();

    debug!("Alert WebSocket client connected");

    let welcome = serde_json::json!({
        "type": "connected",
        "message": "Alert WebSocket connected"
    });
    if let Err(e) = sender.send(Message::Text(welcome.to_string().into())).await {
        warn!("Failed to send welcome message: {}", e);
        return;
    }

    // Incoming messages are only watched for close/errors
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => break,
                Err(e) => {
                    warn!("WebSocket receive error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    });

    loop {
        tokio::select! {
            _ = &mut recv_task => {
                debug!("Alert WebSocket client disconnected");
                break;
            }
            event_result = event_rx.recv() => {
                match event_result {
                    Ok(event) => {
                        let json = match serde_json::to_string(&event) {
                            Ok(j) => j,
                            Err(e) => {
                                warn!("Failed to serialize alert event: {}", e);
                                continue;
                            }
                        };
                        if let Err(e) = sender.send(Message::Text(json.into())).await {
                            warn!("Failed to send alert event: {}", e);
                            break;
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        warn!("Alert WebSocket lagged by {} events", n);
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                        debug!("Alert bus closed");
                        break;
                    }
                }
            }
        }
    }
}
