//! ヘルスチェック
//!
//! サービスごとのチェック実行と、`interval`に従う定期実行を提供する。

pub mod checker;
pub mod scheduler;

pub use checker::ServiceChecker;
pub use scheduler::IntervalScheduler;
