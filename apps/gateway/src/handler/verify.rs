//! # 照会済み認証ハンドラ
//!
//! ## エンドポイント
//!
//! - `GET /auth/cpf/verify?cpf=<CPF>` - 照会 API で確認済みの CPF にトークンを発行
//!
//! レスポンスはすべてプレーンテキスト。

use std::sync::Arc;

use axum::{
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};
use cpfgate_domain::DomainError;
use serde::Deserialize;

use crate::{
    error::{GatewayError, TextError},
    usecase::VerifyUseCase,
};

/// 照会済み認証ハンドラの共有状態
pub struct VerifyState {
    pub usecase: Arc<dyn VerifyUseCase>,
}

/// クエリパラメータ
#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    pub cpf: Option<String>,
}

/// GET /auth/cpf/verify
///
/// 成功時は `JWT Token: <token>` を返す。
/// `cpf` の重複などでクエリを解釈できない場合は不正な CPF として扱う。
pub async fn verify(
    State(state): State<Arc<VerifyState>>,
    query: Result<Query<VerifyQuery>, QueryRejection>,
) -> Result<impl IntoResponse, TextError> {
    let Query(query) = query.map_err(|e| {
        tracing::debug!(error = %e, "クエリを解釈できません");
        GatewayError::Cpf(DomainError::InvalidCpf)
    })?;

    let raw_cpf = query
        .cpf
        .filter(|cpf| !cpf.is_empty())
        .ok_or(GatewayError::Cpf(DomainError::MissingCpf))?;

    let token = state.usecase.verify(&raw_cpf).await?;

    Ok((StatusCode::OK, format!("JWT Token: {token}")))
}
