//! 監視API
//!
//! - `POST /monitor`: 監視ラウンドを即時実行し、登録順の結果を返す
//! - `GET /api/services`: 登録サービス一覧
//! - `GET /api/health`: 稼働確認

use super::error::AppError;
use crate::common::types::{RoundResult, ServiceConfig};
use crate::AppState;
use axum::{extract::State, Json};
use serde_json::{json, Value};

/// POST /monitor
pub async fn trigger_round(State(state): State<AppState>) -> Result<Json<RoundResult>, AppError> {
    let results = state.registry.run_round().await?;
    Ok(Json(results))
}

/// GET /api/services
pub async fn list_services(State(state): State<AppState>) -> Json<Vec<ServiceConfig>> {
    let services = state
        .registry
        .descriptors()
        .await
        .iter()
        .map(ServiceConfig::from)
        .collect();
    Json(services)
}

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "services": state.registry.len().await,
    }))
}
