//! # Gateway エラー定義
//!
//! ゲートウェイ固有のエラーと、HTTP レスポンスへの変換を定義する。
//!
//! 2 つのフローはエラー本文の形式が異なるため、レスポンス変換は
//! ラッパー型ごとに用意する:
//!
//! | フロー | ラッパー | 本文 |
//! |--------|----------|------|
//! | カスタム認証（`POST /auth/cpf`） | [`JsonError`] | `{"error": "<メッセージ>"}` |
//! | 照会済み認証（`GET /auth/cpf/verify`） | [`TextError`] | プレーンテキスト |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use cpfgate_domain::DomainError;
use cpfgate_infra::InfraError;
use serde::Serialize;
use thiserror::Error;

/// 内部エラー時にクライアントへ返すメッセージ（照会済み認証フロー）
const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// カスタム認証フローのエラーレスポンス
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// ゲートウェイで発生するエラー
#[derive(Debug, Error)]
pub enum GatewayError {
    /// CPF の欠落・形式不正
    #[error(transparent)]
    Cpf(#[from] DomainError),

    /// リクエスト本文を解釈できない
    #[error("{0}")]
    BadRequest(String),

    /// 照会 API に CPF が登録されていない
    #[error("CPF not found")]
    CpfNotFound,

    /// ID プロバイダ・署名などインフラ層のエラー
    #[error("{0}")]
    Infra(#[from] InfraError),
}

impl GatewayError {
    /// クライアントエラーのステータスコード
    ///
    /// サーバーエラー（インフラ層）の場合は `None`。
    fn client_status(&self) -> Option<StatusCode> {
        match self {
            GatewayError::Cpf(DomainError::MissingCpf) | GatewayError::BadRequest(_) => {
                Some(StatusCode::BAD_REQUEST)
            }
            GatewayError::Cpf(DomainError::InvalidCpf) => Some(StatusCode::UNAUTHORIZED),
            GatewayError::CpfNotFound => Some(StatusCode::NOT_FOUND),
            GatewayError::Infra(_) => None,
        }
    }
}

/// カスタム認証フロー用のレスポンス変換
///
/// インフラ層のエラーは 500 とし、エラーメッセージをそのまま返す。
#[derive(Debug)]
pub struct JsonError(pub GatewayError);

impl From<GatewayError> for JsonError {
    fn from(err: GatewayError) -> Self {
        Self(err)
    }
}

impl IntoResponse for JsonError {
    fn into_response(self) -> Response {
        let status = self.0.client_status().unwrap_or_else(|| {
            log_internal_error(&self.0);
            StatusCode::INTERNAL_SERVER_ERROR
        });

        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

/// 照会済み認証フロー用のレスポンス変換
///
/// インフラ層のエラーは詳細を隠し、固定メッセージの 500 とする。
#[derive(Debug)]
pub struct TextError(pub GatewayError);

impl From<GatewayError> for TextError {
    fn from(err: GatewayError) -> Self {
        Self(err)
    }
}

impl IntoResponse for TextError {
    fn into_response(self) -> Response {
        match self.0.client_status() {
            Some(status) => (status, self.0.to_string()).into_response(),
            None => {
                log_internal_error(&self.0);
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE).into_response()
            }
        }
    }
}

fn log_internal_error(err: &GatewayError) {
    match err {
        GatewayError::Infra(e) => tracing::error!(
            error.kind = "infrastructure",
            error.message = %e,
            span_trace = %e.span_trace(),
            "インフラ層でエラーが発生しました"
        ),
        other => tracing::error!(error.message = %other, "内部エラーが発生しました"),
    }
}
