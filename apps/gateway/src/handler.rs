//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! ## 設計方針
//!
//! - 各ハンドラはサブモジュールに配置
//! - 親モジュールで re-export し、フラットな API を提供
//! - ハンドラは薄く保ち、ビジネスロジックは usecase 層に委譲
//!
//! ## ハンドラ一覧
//!
//! - `health`: ヘルスチェック
//! - `auth`: カスタム認証（JSON 入出力）
//! - `verify`: 照会済み認証（クエリ入力、プレーンテキスト出力）

pub mod auth;
pub mod health;
pub mod verify;

pub use auth::{AuthState, authenticate};
pub use health::health_check;
pub use verify::{VerifyState, verify};
