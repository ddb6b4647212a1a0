//! 共通型定義

/// エラー型
pub mod error;

/// サービス記述子・チェック結果
pub mod types;
