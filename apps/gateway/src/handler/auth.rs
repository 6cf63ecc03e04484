//! # カスタム認証ハンドラ
//!
//! ## エンドポイント
//!
//! - `POST /auth/cpf` - CPF によるカスタム認証
//!
//! リクエスト本文は `Content-Type` に関わらず JSON として解釈する
//! （API Gateway 経由では付与されないことがあるため）。
//! 本文が空の場合は CPF 未指定として扱う。

use std::sync::Arc;

use axum::{Json, body::Bytes, extract::State, response::IntoResponse};
use cpfgate_domain::DomainError;
use serde::{Deserialize, Serialize};

use crate::{
    error::{GatewayError, JsonError},
    usecase::AuthUseCase,
};

/// カスタム認証ハンドラの共有状態
pub struct AuthState {
    pub usecase: Arc<dyn AuthUseCase>,
}

// --- リクエスト/レスポンス型 ---

/// カスタム認証リクエスト
#[derive(Debug, Default, Deserialize)]
pub struct AuthRequest {
    #[serde(default)]
    pub cpf: Option<String>,
}

/// カスタム認証レスポンス
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub id_token:     String,
}

// --- ハンドラ ---

/// POST /auth/cpf
///
/// CPF をユーザー名としてカスタム認証を行い、トークンを返す。
/// ユーザーが存在しない場合は作成してから認証する。
pub async fn authenticate(
    State(state): State<Arc<AuthState>>,
    body: Bytes,
) -> Result<impl IntoResponse, JsonError> {
    let req = parse_request(&body)?;
    let raw_cpf = req
        .cpf
        .filter(|cpf| !cpf.is_empty())
        .ok_or(GatewayError::Cpf(DomainError::MissingCpf))?;

    let tokens = state.usecase.authenticate(&raw_cpf).await?;

    Ok(Json(AuthResponse {
        access_token: tokens.access_token,
        id_token:     tokens.id_token,
    }))
}

fn parse_request(body: &[u8]) -> Result<AuthRequest, GatewayError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(AuthRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| GatewayError::BadRequest(format!("Invalid request body: {e}")))
}
