//! # cpfgate 共有ユーティリティ
//!
//! ゲートウェイ全体で使用される共通ユーティリティを提供する。
//!
//! ## 設計方針
//!
//! - ビジネスロジックを含まない純粋なユーティリティのみを配置
//! - ログ基盤は `observability` feature 有効時のみコンパイルする

#[cfg(feature = "observability")]
pub mod canonical_log;
pub mod health;
pub mod observability;

pub use health::HealthResponse;
