//! # Gateway 設定
//!
//! 環境変数からゲートウェイの設定を読み込む。
//!
//! 読み込みは起動時に 1 回だけ行い、必須項目が欠けていれば起動を中止する。
//! 環境変数の一覧は `main.rs` を参照。

use std::{env, str::FromStr, time::Duration};

use cpfgate_domain::{cpf::CpfPolicy, identity::ProvisioningPolicy};
use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 13010;
const DEFAULT_REGISTRY_TIMEOUT_SECS: u64 = 30;
const DEFAULT_REGISTRY_FALLBACK_NAME: &str = "Teste Usuario";
const DEFAULT_EMAIL_DOMAIN: &str = "email.com";

/// 設定の読み込みエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} が設定されていません")]
    Missing(&'static str),

    #[error("{name} の値が不正です: {value}")]
    Invalid { name: &'static str, value: String },
}

/// ゲートウェイの設定
#[derive(Debug)]
pub struct GatewayConfig {
    /// バインドアドレス（ローカル実行時のみ使用）
    pub host: String,
    /// ポート番号（ローカル実行時のみ使用）
    pub port: u16,
    /// Cognito ユーザープール ID
    pub user_pool_id: String,
    /// Cognito アプリクライアント ID
    pub client_id: String,
    /// Cognito エンドポイント（ローカルエミュレータ用。未設定なら AWS）
    pub cognito_endpoint: Option<String>,
    /// 照会 API の URL
    pub registry_url: String,
    /// 照会 API のタイムアウト
    pub registry_timeout: Duration,
    /// 照会 API が氏名を返さなかった場合の氏名
    pub registry_fallback_name: String,
    /// トークン署名用の共有シークレット
    pub token_signing_secret: SecretString,
    /// ユーザー作成方針
    pub provisioning_policy: ProvisioningPolicy,
    /// 照会済み認証フローの CPF 検証ポリシー
    pub cpf_policy: CpfPolicy,
    /// 作成ユーザーのメールアドレスに使うドメイン
    pub placeholder_email_domain: String,
}

impl GatewayConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.is_empty());
        let required = |name: &'static str| var(name).ok_or(ConfigError::Missing(name));

        Ok(Self {
            host: var("GATEWAY_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or(var("GATEWAY_PORT"), "GATEWAY_PORT", DEFAULT_PORT)?,
            user_pool_id: required("USER_POOL_ID")?,
            client_id: required("CLIENT_ID")?,
            cognito_endpoint: var("COGNITO_ENDPOINT_URL"),
            registry_url: required("API_URL")?,
            registry_timeout: Duration::from_secs(parse_or(
                var("REGISTRY_TIMEOUT_SECS"),
                "REGISTRY_TIMEOUT_SECS",
                DEFAULT_REGISTRY_TIMEOUT_SECS,
            )?),
            registry_fallback_name: var("REGISTRY_FALLBACK_NAME")
                .unwrap_or_else(|| DEFAULT_REGISTRY_FALLBACK_NAME.to_string()),
            token_signing_secret: SecretString::new(required("TOKEN_SIGNING_SECRET")?),
            provisioning_policy: parse_or(
                var("PROVISIONING_POLICY"),
                "PROVISIONING_POLICY",
                ProvisioningPolicy::default(),
            )?,
            cpf_policy: CpfPolicy::from_check_digits(
                var("CPF_CHECK_DIGITS").is_some_and(|v| v.eq_ignore_ascii_case("true")),
            ),
            placeholder_email_domain: var("PLACEHOLDER_EMAIL_DOMAIN")
                .unwrap_or_else(|| DEFAULT_EMAIL_DOMAIN.to_string()),
        })
    }
}

/// 値があればパースし、なければデフォルト値を返す
fn parse_or<T: FromStr>(
    value: Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(v) => v.parse().map_err(|_| ConfigError::Invalid { name, value: v }),
        None => Ok(default),
    }
}
