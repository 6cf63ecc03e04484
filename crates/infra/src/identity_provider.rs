//! # ID プロバイダ（Amazon Cognito）
//!
//! Cognito ユーザープールに対する管理者 API 呼び出しを担当する。
//!
//! ## 設計方針
//!
//! - **ユーザー名は正規化済み CPF**: すべての API をユーザー名で呼び出す
//! - **ユーザー不在は分岐**: `UserNotFoundException` は
//!   [`InfraErrorKind::UserNotFound`](crate::InfraErrorKind::UserNotFound) に変換し、
//!   ユースケース側でプロビジョニングへ進む
//! - **作成の冪等性**: 同じ CPF の初回リクエストが並行した場合、後続の作成は
//!   `UsernameExistsException` になる。これは成功として扱う
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use cpfgate_infra::identity_provider::{self, CognitoIdentityProvider};
//!
//! async fn setup() {
//!     let client = identity_provider::create_client(None).await;
//!     let provider = CognitoIdentityProvider::new(client, "sa-east-1_xxx", "client-id");
//! }
//! ```

use async_trait::async_trait;
use aws_sdk_cognitoidentityprovider::{
    Client,
    error::DisplayErrorContext,
    types::{AttributeType, AuthFlowType, MessageActionType},
};
use cpfgate_domain::identity::UserAttribute;

use crate::InfraError;

/// カスタム認証フローで ID プロバイダが発行するトークン
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthTokens {
    pub access_token: String,
    pub id_token:     String,
}

/// ID プロバイダのインターフェース
///
/// テスト時はスタブに差し替え可能。
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// カスタム認証チャレンジを開始する
    ///
    /// # エラー
    ///
    /// - ユーザーが存在しない場合は `UserNotFound`
    /// - 認証結果ではなく追加のチャレンジが返った場合は `IdentityProvider`
    async fn initiate_custom_auth(&self, username: &str) -> Result<AuthTokens, InfraError>;

    /// ユーザーを作成する（通知メッセージは抑止）
    ///
    /// 既に同名のユーザーが存在する場合は成功として扱う。
    ///
    /// # 引数
    ///
    /// * `username` - ユーザー名（正規化済み CPF）
    /// * `attributes` - 作成時に設定する属性
    /// * `temporary_password` - 一時パスワード。`None` ならパスワードを指定しない
    async fn create_user(
        &self,
        username: &str,
        attributes: &[UserAttribute],
        temporary_password: Option<&str>,
    ) -> Result<(), InfraError>;

    /// パスワードを恒久パスワードとして設定する
    async fn set_permanent_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(), InfraError>;

    /// ユーザー属性を更新する
    ///
    /// # エラー
    ///
    /// ユーザーが存在しない場合は `UserNotFound`
    async fn update_user_attributes(
        &self,
        username: &str,
        attributes: &[UserAttribute],
    ) -> Result<(), InfraError>;
}

/// Cognito ユーザープールによる [`IdentityProvider`] の実装
pub struct CognitoIdentityProvider {
    client:       Client,
    user_pool_id: String,
    client_id:    String,
}

impl CognitoIdentityProvider {
    /// 新しいプロバイダを作成する
    ///
    /// # 引数
    ///
    /// * `client` - Cognito クライアント
    /// * `user_pool_id` - ユーザープール ID
    /// * `client_id` - アプリクライアント ID（カスタム認証フローを許可していること）
    pub fn new(
        client: Client,
        user_pool_id: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            user_pool_id: user_pool_id.into(),
            client_id: client_id.into(),
        }
    }
}

/// SDK エラーを例外名とメッセージを含む文字列にする
///
/// `SdkError` の `Display` はサービスエラーの詳細を含まないため、
/// エラーチェーン全体を展開する。
fn describe<E: std::error::Error>(err: &E) -> String {
    DisplayErrorContext(err).to_string()
}

fn to_attribute_types(attributes: &[UserAttribute]) -> Result<Vec<AttributeType>, InfraError> {
    attributes
        .iter()
        .map(|attr| {
            AttributeType::builder()
                .name(&attr.name)
                .value(&attr.value)
                .build()
                .map_err(|e| {
                    InfraError::identity_provider(format!("AttributeType 構築エラー: {e}"))
                })
        })
        .collect()
}

#[async_trait]
impl IdentityProvider for CognitoIdentityProvider {
    async fn initiate_custom_auth(&self, username: &str) -> Result<AuthTokens, InfraError> {
        let output = self
            .client
            .admin_initiate_auth()
            .user_pool_id(&self.user_pool_id)
            .client_id(&self.client_id)
            .auth_flow(AuthFlowType::CustomAuth)
            .auth_parameters("USERNAME", username)
            .send()
            .await
            .map_err(|err| {
                let is_user_not_found = err
                    .as_service_error()
                    .map(|e| e.is_user_not_found_exception())
                    .unwrap_or(false);
                if is_user_not_found {
                    InfraError::user_not_found(username)
                } else {
                    InfraError::identity_provider(format!(
                        "カスタム認証の開始に失敗: {}",
                        describe(&err)
                    ))
                }
            })?;

        let Some(result) = output.authentication_result() else {
            let challenge = output
                .challenge_name()
                .map(|c| c.as_str().to_string())
                .unwrap_or_default();
            return Err(InfraError::identity_provider(format!(
                "認証結果が返されませんでした（チャレンジ: {challenge}）"
            )));
        };

        match (result.access_token(), result.id_token()) {
            (Some(access_token), Some(id_token)) => Ok(AuthTokens {
                access_token: access_token.to_string(),
                id_token:     id_token.to_string(),
            }),
            _ => Err(InfraError::identity_provider(
                "認証結果にトークンが含まれていません",
            )),
        }
    }

    async fn create_user(
        &self,
        username: &str,
        attributes: &[UserAttribute],
        temporary_password: Option<&str>,
    ) -> Result<(), InfraError> {
        let result = self
            .client
            .admin_create_user()
            .user_pool_id(&self.user_pool_id)
            .username(username)
            .set_user_attributes(Some(to_attribute_types(attributes)?))
            .set_temporary_password(temporary_password.map(str::to_string))
            .message_action(MessageActionType::Suppress)
            .send()
            .await;

        match result {
            Ok(_) => {
                tracing::info!("ID プロバイダにユーザーを作成しました");
                Ok(())
            }
            Err(err) => {
                // 同じ CPF の初回リクエストが並行した場合に発生しうる
                let is_username_exists = err
                    .as_service_error()
                    .map(|e| e.is_username_exists_exception())
                    .unwrap_or(false);
                if is_username_exists {
                    tracing::debug!("ユーザーは既に存在します（UsernameExistsException）");
                    return Ok(());
                }
                Err(InfraError::identity_provider(format!(
                    "ユーザーの作成に失敗: {}",
                    describe(&err)
                )))
            }
        }
    }

    async fn set_permanent_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(), InfraError> {
        self.client
            .admin_set_user_password()
            .user_pool_id(&self.user_pool_id)
            .username(username)
            .password(password)
            .permanent(true)
            .send()
            .await
            .map_err(|err| {
                let is_user_not_found = err
                    .as_service_error()
                    .map(|e| e.is_user_not_found_exception())
                    .unwrap_or(false);
                if is_user_not_found {
                    InfraError::user_not_found(username)
                } else {
                    InfraError::identity_provider(format!(
                        "パスワードの設定に失敗: {}",
                        describe(&err)
                    ))
                }
            })?;

        Ok(())
    }

    async fn update_user_attributes(
        &self,
        username: &str,
        attributes: &[UserAttribute],
    ) -> Result<(), InfraError> {
        self.client
            .admin_update_user_attributes()
            .user_pool_id(&self.user_pool_id)
            .username(username)
            .set_user_attributes(Some(to_attribute_types(attributes)?))
            .send()
            .await
            .map_err(|err| {
                let is_user_not_found = err
                    .as_service_error()
                    .map(|e| e.is_user_not_found_exception())
                    .unwrap_or(false);
                if is_user_not_found {
                    InfraError::user_not_found(username)
                } else {
                    InfraError::identity_provider(format!(
                        "ユーザー属性の更新に失敗: {}",
                        describe(&err)
                    ))
                }
            })?;

        tracing::info!("ユーザー属性を更新しました");
        Ok(())
    }
}

/// Cognito クライアントを作成する
///
/// `endpoint` が `Some` の場合はローカルエミュレータ等のカスタムエンドポイントに接続する。
/// リージョンと認証情報は SDK のデフォルトチェーンで解決する
/// （Lambda 実行時は実行ロール、ローカルでは `AWS_*` 環境変数）。
pub async fn create_client(endpoint: Option<&str>) -> Client {
    let mut config_builder = aws_config::defaults(aws_config::BehaviorVersion::latest());

    if let Some(endpoint_url) = endpoint {
        config_builder = config_builder.endpoint_url(endpoint_url);
    }

    let config = config_builder.load().await;
    Client::new(&config)
}
