//! # ヘルスチェックハンドラ
//!
//! レスポンス型は [`cpfgate_shared::HealthResponse`] を参照。

use axum::Json;
use cpfgate_shared::HealthResponse;

/// ゲートウェイのヘルスチェックエンドポイント
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy(env!("CARGO_PKG_VERSION")))
}
