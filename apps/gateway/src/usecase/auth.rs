//! # カスタム認証ユースケース
//!
//! CPF をユーザー名として ID プロバイダのカスタム認証フローを開始する。
//!
//! ## 処理の流れ
//!
//! ```text
//! CPF 正規化 → 認証開始 ──成功──→ トークン
//!                 │
//!            ユーザー不在
//!                 ↓
//!          ユーザー作成 → 認証開始（1 回のみ再試行）
//! ```
//!
//! 再試行でもユーザー不在となった場合はそのままエラーとして返す。

use std::sync::Arc;

use cpfgate_domain::cpf::Cpf;
use cpfgate_infra::{AuthTokens, IdentityProvider};

use super::Provisioner;
use crate::error::GatewayError;

/// カスタム認証ユースケースの実装
pub struct AuthUseCaseImpl {
    identity_provider: Arc<dyn IdentityProvider>,
    provisioner:       Arc<Provisioner>,
}

impl AuthUseCaseImpl {
    /// 新しいユースケースインスタンスを作成
    pub fn new(identity_provider: Arc<dyn IdentityProvider>, provisioner: Arc<Provisioner>) -> Self {
        Self {
            identity_provider,
            provisioner,
        }
    }

    /// CPF でカスタム認証を行う
    ///
    /// CPF は数字以外を除去するだけで、桁数は検証しない。
    pub async fn authenticate(&self, raw_cpf: &str) -> Result<AuthTokens, GatewayError> {
        let cpf = Cpf::normalized(raw_cpf)?;

        match self.identity_provider.initiate_custom_auth(cpf.as_str()).await {
            Ok(tokens) => {
                tracing::info!(cpf = %cpf, "カスタム認証に成功しました");
                Ok(tokens)
            }
            Err(e) if e.is_user_not_found() => {
                tracing::info!(cpf = %cpf, "ユーザーが存在しないため作成して再試行します");
                self.provisioner.provision(&cpf).await?;

                let tokens = self
                    .identity_provider
                    .initiate_custom_auth(cpf.as_str())
                    .await?;
                tracing::info!(cpf = %cpf, "作成したユーザーでカスタム認証に成功しました");
                Ok(tokens)
            }
            Err(e) => Err(e.into()),
        }
    }
}
