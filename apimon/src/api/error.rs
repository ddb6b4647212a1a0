//! APIエラーレスポンス型
//!
//! axum用の共通エラーハンドリング

use crate::common::error::MonitorError;
use axum::{response::IntoResponse, Json};
use serde_json::json;
use tracing::{error, warn};

/// Axum用のエラーレスポンス型
#[derive(Debug)]
pub struct AppError(pub MonitorError);

impl From<MonitorError> for AppError {
    fn from(err: MonitorError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        // 詳細はログにのみ出力し、クライアントには external_message() を返す
        if self.0.is_config_error() {
            warn!(error = %self.0, "Request rejected");
        } else {
            error!(error = %self.0, "Request failed");
        }

        let payload = json!({
            "error": self.0.external_message()
        });

        (self.0.status_code(), Json(payload)).into_response()
    }
}
