//! REST APIハンドラー

pub mod alerts_ws;
pub mod error;
pub mod monitor;

use crate::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// ルーターを構築
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/monitor", post(monitor::trigger_round))
        .route("/api/services", get(monitor::list_services))
        .route("/api/health", get(monitor::health))
        .route("/ws/alerts", get(alerts_ws::alerts_ws_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
