//! # cpfgate ゲートウェイ
//!
//! ブラジルの CPF を唯一の識別子として、Amazon Cognito ユーザープールで
//! パスワードレス認証を行う HTTP ゲートウェイ。
//!
//! ## エンドポイント
//!
//! | メソッド | パス | 内容 |
//! |---------|------|------|
//! | `POST` | `/auth/cpf` | カスタム認証。ID プロバイダのトークンを JSON で返す |
//! | `GET` | `/auth/cpf/verify?cpf=` | 照会 API で確認済みの CPF に署名済みトークンを発行する |
//! | `GET` | `/health` | ヘルスチェック |
//!
//! どちらの認証フローも、ユーザーが存在しなければ作成して 1 回だけ再試行する。
//!
//! ## 実行環境
//!
//! `AWS_LAMBDA_RUNTIME_API` が設定されていれば Lambda ランタイムとして、
//! そうでなければローカルの HTTP サーバーとして起動する。
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `USER_POOL_ID` | **Yes** | Cognito ユーザープール ID |
//! | `CLIENT_ID` | **Yes** | Cognito アプリクライアント ID |
//! | `API_URL` | **Yes** | CPF 照会 API の URL |
//! | `TOKEN_SIGNING_SECRET` | **Yes** | HS256 署名用の共有シークレット |
//! | `REGISTRY_TIMEOUT_SECS` | No | 照会 API のタイムアウト秒数（デフォルト: `30`） |
//! | `REGISTRY_FALLBACK_NAME` | No | 氏名が取得できない場合の氏名（デフォルト: `Teste Usuario`） |
//! | `PROVISIONING_POLICY` | No | `passwordless`（デフォルト）または `random-password` |
//! | `CPF_CHECK_DIGITS` | No | `true` でチェックディジットを検証（デフォルト: `false`） |
//! | `PLACEHOLDER_EMAIL_DOMAIN` | No | 作成ユーザーのメールドメイン（デフォルト: `email.com`） |
//! | `COGNITO_ENDPOINT_URL` | No | Cognito エンドポイント（ローカルエミュレータ用） |
//! | `GATEWAY_HOST` | No | バインドアドレス（ローカル実行時、デフォルト: `0.0.0.0`） |
//! | `GATEWAY_PORT` | No | ポート番号（ローカル実行時、デフォルト: `13010`） |
//! | `LOG_FORMAT` | No | `json` または `pretty`（デフォルト） |
//!
//! ## 起動方法
//!
//! ```bash
//! # ローカル
//! cargo run -p cpfgate-gateway
//!
//! # Lambda 向けビルド
//! cargo lambda build -p cpfgate-gateway --release
//! ```

mod app_builder;
mod config;
mod error;
mod handler;
mod usecase;

use std::{net::SocketAddr, sync::Arc};

use app_builder::Dependencies;
use config::GatewayConfig;
use cpfgate_infra::{
    CognitoIdentityProvider,
    Hs256TokenSigner,
    HttpRegistryClient,
    RandomPasswordGenerator,
    identity_provider,
};
use cpfgate_shared::observability::{TracingConfig, init_tracing};
use tokio::net::TcpListener;

/// Lambda 実行環境でのみ設定される環境変数
const LAMBDA_RUNTIME_API_VAR: &str = "AWS_LAMBDA_RUNTIME_API";

/// ゲートウェイのエントリーポイント
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    // トレーシング初期化
    init_tracing(TracingConfig::from_env("gateway"));
    let _tracing_guard = tracing::info_span!("app", service = "gateway").entered();

    // 設定読み込み
    let config = GatewayConfig::from_env()?;

    // 依存コンポーネントを初期化（全リクエストで共有）
    let cognito_client = identity_provider::create_client(config.cognito_endpoint.as_deref()).await;
    let deps = Dependencies {
        identity_provider:  Arc::new(CognitoIdentityProvider::new(
            cognito_client,
            &config.user_pool_id,
            &config.client_id,
        )),
        registry:           Arc::new(HttpRegistryClient::new(
            &config.registry_url,
            config.registry_timeout,
            &config.registry_fallback_name,
        )?),
        token_signer:       Arc::new(Hs256TokenSigner::new(&config.token_signing_secret)),
        password_generator: Arc::new(RandomPasswordGenerator::new()),
    };

    let app = app_builder::build_app(&config, deps);

    if std::env::var_os(LAMBDA_RUNTIME_API_VAR).is_some() {
        tracing::info!(
            provisioning_policy = %config.provisioning_policy,
            "Lambda ランタイムとして起動します"
        );
        lambda_http::run(app)
            .await
            .map_err(|e| anyhow::anyhow!(e))?;
        return Ok(());
    }

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(
        provisioning_policy = %config.provisioning_policy,
        "ゲートウェイが起動しました: {}",
        addr
    );

    axum::serve(listener, app).await?;

    Ok(())
}
