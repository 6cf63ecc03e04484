//! # Gateway アプリケーション構築
//!
//! ユースケースの組み立てとルーター構築を担当する。
//! `main.rs` は設定読み込みと実行環境（Lambda / ローカル）の切り替えに集中する。

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use cpfgate_infra::{IdentityProvider, PasswordGenerator, RegistryClient, TokenSigner};
use cpfgate_shared::{canonical_log::CanonicalLogLineLayer, observability::make_request_span};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{
    config::GatewayConfig,
    handler::{AuthState, VerifyState, authenticate, health_check, verify},
    usecase::{AuthUseCaseImpl, Provisioner, VerifyUseCaseImpl},
};

/// ルーターが依存する外部コンポーネント
pub struct Dependencies {
    pub identity_provider:  Arc<dyn IdentityProvider>,
    pub registry:           Arc<dyn RegistryClient>,
    pub token_signer:       Arc<dyn TokenSigner>,
    pub password_generator: Arc<dyn PasswordGenerator>,
}

/// ユースケースを組み立ててルーターを構築する
///
/// クライアント類は呼び出し側で 1 回だけ生成し、全リクエストで共有する。
pub fn build_app(config: &GatewayConfig, deps: Dependencies) -> Router {
    let provisioner = Arc::new(Provisioner::new(
        deps.identity_provider.clone(),
        deps.password_generator,
        config.provisioning_policy,
        &config.placeholder_email_domain,
    ));

    let auth_state = Arc::new(AuthState {
        usecase: Arc::new(AuthUseCaseImpl::new(
            deps.identity_provider.clone(),
            provisioner.clone(),
        )),
    });
    let verify_state = Arc::new(VerifyState {
        usecase: Arc::new(VerifyUseCaseImpl::new(
            deps.identity_provider,
            deps.registry,
            deps.token_signer,
            provisioner,
            config.cpf_policy,
        )),
    });

    build_router(auth_state, verify_state)
}

/// ルーター構築
fn build_router(auth_state: Arc<AuthState>, verify_state: Arc<VerifyState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(
            Router::new()
                .route("/auth/cpf", post(authenticate))
                .with_state(auth_state),
        )
        .merge(
            Router::new()
                .route("/auth/cpf/verify", get(verify))
                .with_state(verify_state),
        )
        // レイヤー順序: 下に書いたものが外側
        // 1. SetRequestIdLayer（最外）: X-Request-Id がなければ UUID を生成
        // 2. TraceLayer: request_id を含むスパンを作成
        // 3. CanonicalLogLineLayer: リクエスト完了時に 1 行サマリログを出力（スパン内）
        // 4. PropagateRequestIdLayer: レスポンスヘッダーに X-Request-Id をコピー
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(CanonicalLogLineLayer)
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
    };
    use cpfgate_domain::{cpf::CpfPolicy, identity::ProvisioningPolicy};
    use cpfgate_infra::mock::{
        MockIdentityProvider,
        MockPasswordGenerator,
        MockRegistryClient,
        MockTokenSigner,
    };
    use pretty_assertions::assert_eq;
    use secrecy::SecretString;
    use tower::ServiceExt;

    use super::*;

    fn test_config() -> GatewayConfig {
        GatewayConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            user_pool_id: "pool".to_string(),
            client_id: "client".to_string(),
            cognito_endpoint: None,
            registry_url: "http://registry.invalid".to_string(),
            registry_timeout: Duration::from_secs(1),
            registry_fallback_name: "Teste Usuario".to_string(),
            token_signing_secret: SecretString::new("secret".to_string()),
            provisioning_policy: ProvisioningPolicy::Passwordless,
            cpf_policy: CpfPolicy::Lenient,
            placeholder_email_domain: "email.com".to_string(),
        }
    }

    fn create_test_app(provider: &MockIdentityProvider, registry: &MockRegistryClient) -> Router {
        build_app(
            &test_config(),
            Dependencies {
                identity_provider:  Arc::new(provider.clone()),
                registry:           Arc::new(registry.clone()),
                token_signer:       Arc::new(MockTokenSigner),
                password_generator: Arc::new(MockPasswordGenerator::default()),
            },
        )
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_healthはバージョンを返す() {
        // Given
        let sut = create_test_app(&MockIdentityProvider::new(), &MockRegistryClient::new());
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        // When
        let response = sut.oneshot(request).await.unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value =
            serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_カスタム認証で初回ユーザーが作成される() {
        // Given
        let provider = MockIdentityProvider::new();
        let sut = create_test_app(&provider, &MockRegistryClient::new());
        let request = Request::builder()
            .method(Method::POST)
            .uri("/auth/cpf")
            .body(Body::from(r#"{"cpf": "529.982.247-25"}"#))
            .unwrap();

        // When
        let response = sut.oneshot(request).await.unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value =
            serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "access_token": "access-52998224725",
                "id_token": "id-52998224725",
            })
        );
        assert_eq!(
            provider.attribute("52998224725", "custom:cpf"),
            Some("52998224725".to_string())
        );
    }

    #[tokio::test]
    async fn test_照会済み認証でトークンが保存される() {
        // Given
        let provider = MockIdentityProvider::new();
        let registry = MockRegistryClient::new();
        registry.add_record("52998224725", "Maria Silva");
        let sut = create_test_app(&provider, &registry);
        let request = Request::builder()
            .uri("/auth/cpf/verify?cpf=529.982.247-25")
            .body(Body::empty())
            .unwrap();

        // When
        let response = sut.oneshot(request).await.unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_string(response).await,
            "JWT Token: signed.52998224725.Maria Silva"
        );
        assert_eq!(
            provider.attribute("52998224725", "custom:jwtToken"),
            Some("signed.52998224725.Maria Silva".to_string())
        );
    }

    #[tokio::test]
    async fn test_レスポンスにリクエストidが付与される() {
        // Given
        let sut = create_test_app(&MockIdentityProvider::new(), &MockRegistryClient::new());
        let request = Request::builder()
            .uri("/auth/cpf/verify")
            .header("x-request-id", "req-123")
            .body(Body::empty())
            .unwrap();

        // When
        let response = sut.oneshot(request).await.unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok()),
            Some("req-123")
        );
    }

    #[tokio::test]
    async fn test_未定義のパスは404() {
        let sut = create_test_app(&MockIdentityProvider::new(), &MockRegistryClient::new());
        let request = Request::builder()
            .uri("/unknown")
            .body(Body::empty())
            .unwrap();

        let response = sut.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
