//! # ユースケース層
//!
//! ゲートウェイの 2 つの認証フローを実装する。
//!
//! ## 設計方針
//!
//! - **トレイトベースの設計**: ハンドラテストでスタブに差し替えるためトレイトを定義
//! - **依存性注入**: ID プロバイダ・照会 API・署名器は外部から注入
//! - **プロビジョニングの共通化**: ユーザー不在時の作成は [`Provisioner`] に集約
//!
//! ## フロー
//!
//! | ユースケース | 入力 | 成功時 |
//! |-------------|------|--------|
//! | [`AuthUseCase`] | 任意書式の CPF | ID プロバイダのトークン |
//! | [`VerifyUseCase`] | 任意書式の CPF | 署名済みトークン |

pub mod auth;
pub mod provisioning;
pub mod verify;

use async_trait::async_trait;
pub use auth::AuthUseCaseImpl;
use cpfgate_infra::AuthTokens;
pub use provisioning::Provisioner;
pub use verify::VerifyUseCaseImpl;

use crate::error::GatewayError;

/// カスタム認証ユースケーストレイト
#[async_trait]
pub trait AuthUseCase: Send + Sync {
    /// CPF でカスタム認証を行い、トークンを取得する
    ///
    /// ## 引数
    ///
    /// - `raw_cpf`: クライアントが送信した CPF（書式記号を含んでよい）
    ///
    /// ## 戻り値
    ///
    /// - `Ok(AuthTokens)`: アクセストークンと ID トークン
    /// - `Err(GatewayError)`: CPF の欠落、または ID プロバイダのエラー
    async fn authenticate(&self, raw_cpf: &str) -> Result<AuthTokens, GatewayError>;
}

/// 照会済み認証ユースケーストレイト
#[async_trait]
pub trait VerifyUseCase: Send + Sync {
    /// 照会 API で CPF を確認し、署名済みトークンを発行・保存する
    ///
    /// ## 戻り値
    ///
    /// - `Ok(String)`: 署名済みトークン
    /// - `Err(GatewayError)`: CPF の欠落・不正・未登録、または内部エラー
    async fn verify(&self, raw_cpf: &str) -> Result<String, GatewayError>;
}

#[async_trait]
impl AuthUseCase for AuthUseCaseImpl {
    async fn authenticate(&self, raw_cpf: &str) -> Result<AuthTokens, GatewayError> {
        self.authenticate(raw_cpf).await
    }
}

#[async_trait]
impl VerifyUseCase for VerifyUseCaseImpl {
    async fn verify(&self, raw_cpf: &str) -> Result<String, GatewayError> {
        self.verify(raw_cpf).await
    }
}
