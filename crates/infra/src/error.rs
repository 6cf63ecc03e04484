//! # インフラ層エラー定義
//!
//! ID プロバイダや照会 API との通信で発生するエラーを表現する。
//!
//! ## 設計方針
//!
//! - **期待される分岐の明示**: ユーザー不在（`UserNotFound`）は異常ではなく
//!   ユースケースがプロビジョニングに進むための分岐として扱う
//! - **SDK エラーの文字列化**: AWS SDK のエラー型はジェネリクスが深いため
//!   メッセージに変換して保持する
//! - **SpanTrace 自動捕捉**: convenience constructor や `From` 実装で
//!   エラー生成時の呼び出し経路を自動記録する
//!
//! ## 構造
//!
//! `std::io::Error` と同じ struct + enum パターンを採用:
//! - [`InfraError`]: エラー種別（[`InfraErrorKind`]）と [`SpanTrace`] を保持するラッパー
//! - [`InfraErrorKind`]: エラーの具体的な種別

use std::fmt;

use cpfgate_domain::cpf::mask;
use derive_more::Display;
use thiserror::Error;
use tracing_error::SpanTrace;

/// インフラ層で発生するエラー
///
/// エラー種別（[`InfraErrorKind`]）と [`SpanTrace`]（呼び出し経路）を保持する。
///
/// ## パターンマッチ
///
/// ```ignore
/// match error.kind() {
///     InfraErrorKind::UserNotFound { username } => { /* プロビジョニング */ }
///     _ => { /* その他 */ }
/// }
/// ```
#[derive(Display)]
#[display("{kind}")]
pub struct InfraError {
    kind:       InfraErrorKind,
    span_trace: SpanTrace,
}

/// インフラ層エラーの種別
#[derive(Debug, Error)]
pub enum InfraErrorKind {
    /// ID プロバイダにユーザーが存在しない
    #[error("ユーザーが存在しません: {}", mask(.username))]
    UserNotFound {
        /// 対象のユーザー名（正規化済み CPF）
        username: String,
    },

    /// ID プロバイダのエラー
    ///
    /// Cognito API の呼び出し失敗、想定外のレスポンスなど。
    #[error("ID プロバイダエラー: {0}")]
    IdentityProvider(String),

    /// 照会 API のエラー
    ///
    /// 接続失敗、タイムアウト、5xx 応答。
    #[error("照会 API エラー: {0}")]
    Registry(String),

    /// トークン署名エラー
    #[error("トークン署名エラー: {0}")]
    TokenSigning(#[source] jsonwebtoken::errors::Error),

    /// シリアライズ/デシリアライズエラー
    #[error("シリアライズエラー: {0}")]
    Serialization(#[source] serde_json::Error),

    /// 予期しないエラー
    #[error("予期しないエラー: {0}")]
    Unexpected(String),
}

// ===== InfraError のメソッド =====

impl InfraError {
    /// エラー種別を取得する
    pub fn kind(&self) -> &InfraErrorKind {
        &self.kind
    }

    /// SpanTrace を取得する
    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }

    /// ユーザー不在エラーかどうか
    pub fn is_user_not_found(&self) -> bool {
        matches!(self.kind, InfraErrorKind::UserNotFound { .. })
    }

    // ===== Convenience constructors =====

    /// ユーザー不在エラーを生成する
    pub fn user_not_found(username: impl Into<String>) -> Self {
        Self::from_kind(InfraErrorKind::UserNotFound {
            username: username.into(),
        })
    }

    /// ID プロバイダエラーを生成する
    pub fn identity_provider(msg: impl Into<String>) -> Self {
        Self::from_kind(InfraErrorKind::IdentityProvider(msg.into()))
    }

    /// 照会 API エラーを生成する
    pub fn registry(msg: impl Into<String>) -> Self {
        Self::from_kind(InfraErrorKind::Registry(msg.into()))
    }

    /// 予期しないエラーを生成する
    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self::from_kind(InfraErrorKind::Unexpected(msg.into()))
    }

    fn from_kind(kind: InfraErrorKind) -> Self {
        Self {
            kind,
            span_trace: SpanTrace::capture(),
        }
    }
}

// ===== トレイト実装 =====

impl fmt::Debug for InfraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfraError")
            .field("kind", &self.kind)
            .field("span_trace", &self.span_trace)
            .finish()
    }
}

impl std::error::Error for InfraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.kind.source()
    }
}

// ===== From 実装（SpanTrace 自動キャプチャ） =====

impl From<jsonwebtoken::errors::Error> for InfraError {
    fn from(source: jsonwebtoken::errors::Error) -> Self {
        Self::from_kind(InfraErrorKind::TokenSigning(source))
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(source: serde_json::Error) -> Self {
        Self::from_kind(InfraErrorKind::Serialization(source))
    }
}

#[cfg(test)]
mod tests {
    use tracing_subscriber::layer::SubscriberExt as _;

    use super::*;

    /// テスト用に ErrorLayer 付き subscriber を設定する
    fn with_error_layer(f: impl FnOnce()) {
        let subscriber = tracing_subscriber::registry().with(tracing_error::ErrorLayer::default());
        let _guard = tracing::subscriber::set_default(subscriber);
        f();
    }

    #[test]
    fn test_user_not_foundでspan_traceがキャプチャされる() {
        with_error_layer(|| {
            let span = tracing::info_span!("test_update_attributes");
            let _enter = span.enter();

            let err = InfraError::user_not_found("52998224725");

            assert!(err.is_user_not_found());
            let trace_str = format!("{}", err.span_trace());
            assert!(
                trace_str.contains("test_update_attributes"),
                "SpanTrace がスパン名を含むこと: {trace_str}",
            );
        });
    }

    #[test]
    fn test_from_serde_json_errorでserializationになる() {
        with_error_layer(|| {
            let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
            let err: InfraError = json_err.into();

            assert!(matches!(err.kind(), InfraErrorKind::Serialization(_)));
        });
    }

    #[test]
    fn test_identity_providerはユーザー不在ではない() {
        let err = InfraError::identity_provider("NotAuthorizedException");
        assert!(!err.is_user_not_found());
        assert!(matches!(
            err.kind(),
            InfraErrorKind::IdentityProvider(msg) if msg == "NotAuthorizedException"
        ));
    }

    #[test]
    fn test_displayがinfra_error_kindのメッセージを出力する() {
        let err = InfraError::registry("タイムアウト");
        assert_eq!(format!("{err}"), "照会 API エラー: タイムアウト");
    }

    #[test]
    fn test_sourceがinfra_error_kindに委譲する() {
        use std::error::Error;

        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: InfraError = json_err.into();
        assert!(err.source().is_some());

        let err = InfraError::unexpected("test");
        assert!(err.source().is_none());
    }

    #[test]
    fn test_user_not_foundのメッセージはユーザー名をマスクする() {
        let err = InfraError::user_not_found("52998224725");

        let message = err.to_string();

        assert_eq!(message, "ユーザーが存在しません: *******4725");
        assert!(!message.contains("52998224725"));
        assert!(matches!(
            err.kind(),
            InfraErrorKind::UserNotFound { username } if username == "52998224725"
        ));
    }
}
