//! # 照会済み認証ユースケース
//!
//! 外部の照会 API で CPF の登録を確認し、氏名と CPF を署名したトークンを発行する。
//! 発行したトークンは ID プロバイダのユーザー属性 `custom:jwtToken` に保存する。
//!
//! ## 処理の流れ
//!
//! ```text
//! CPF 検証 → 照会 API ──未登録/失敗──→ CpfNotFound
//!               │
//!             登録済み
//!               ↓
//!          トークン署名 → 属性更新 ──ユーザー不在──→ ユーザー作成 → 属性更新（1 回のみ再試行）
//! ```
//!
//! 照会 API の失敗（タイムアウト・接続失敗・5xx）は未登録と同じ扱いにする。

use std::sync::Arc;

use cpfgate_domain::{
    cpf::{Cpf, CpfPolicy},
    identity::{TOKEN_ATTRIBUTE, UserAttribute},
};
use cpfgate_infra::{IdentityProvider, InfraError, RegistryClaims, RegistryClient, TokenSigner};

use super::Provisioner;
use crate::error::GatewayError;

/// 照会済み認証ユースケースの実装
pub struct VerifyUseCaseImpl {
    identity_provider: Arc<dyn IdentityProvider>,
    registry:          Arc<dyn RegistryClient>,
    token_signer:      Arc<dyn TokenSigner>,
    provisioner:       Arc<Provisioner>,
    cpf_policy:        CpfPolicy,
}

impl VerifyUseCaseImpl {
    /// 新しいユースケースインスタンスを作成
    pub fn new(
        identity_provider: Arc<dyn IdentityProvider>,
        registry: Arc<dyn RegistryClient>,
        token_signer: Arc<dyn TokenSigner>,
        provisioner: Arc<Provisioner>,
        cpf_policy: CpfPolicy,
    ) -> Self {
        Self {
            identity_provider,
            registry,
            token_signer,
            provisioner,
            cpf_policy,
        }
    }

    /// CPF を照会し、署名済みトークンを発行・保存する
    pub async fn verify(&self, raw_cpf: &str) -> Result<String, GatewayError> {
        let cpf = Cpf::validated(raw_cpf, self.cpf_policy)?;

        let record = match self.registry.lookup(&cpf).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                tracing::info!(cpf = %cpf, "照会 API に CPF が登録されていません");
                return Err(GatewayError::CpfNotFound);
            }
            Err(e) => {
                tracing::warn!(
                    cpf = %cpf,
                    error.message = %e,
                    "照会 API の呼び出しに失敗したため未登録として扱います"
                );
                return Err(GatewayError::CpfNotFound);
            }
        };

        let token = self.token_signer.sign(&RegistryClaims {
            name: record.name,
            cpf:  record.cpf,
        })?;

        self.store_token(&cpf, &token).await?;
        tracing::info!(cpf = %cpf, "トークンを発行しました");

        Ok(token)
    }

    /// トークンをユーザー属性に保存する
    ///
    /// ユーザーが存在しない場合は作成してから 1 回だけ再試行する。
    async fn store_token(&self, cpf: &Cpf, token: &str) -> Result<(), InfraError> {
        let attributes = [UserAttribute::new(TOKEN_ATTRIBUTE, token)];

        match self
            .identity_provider
            .update_user_attributes(cpf.as_str(), &attributes)
            .await
        {
            Err(e) if e.is_user_not_found() => {
                tracing::info!(cpf = %cpf, "ユーザーが存在しないため作成して再試行します");
                self.provisioner.provision(cpf).await?;
                self.identity_provider
                    .update_user_attributes(cpf.as_str(), &attributes)
                    .await
            }
            other => other,
        }
    }
}
