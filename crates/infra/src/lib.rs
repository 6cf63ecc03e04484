//! # cpfgate インフラ層
//!
//! 外部システムとの接続・通信を担当するインフラストラクチャ層。
//!
//! ## 責務
//!
//! - **ID プロバイダ**: Cognito ユーザープールの管理者 API 呼び出し
//! - **照会 API**: CPF 登録確認のための HTTP 呼び出し
//! - **トークン署名**: HS256 によるクレーム署名
//! - **パスワード生成**: ユーザー作成時のランダムパスワード
//!
//! ## 依存関係
//!
//! ```text
//! gateway → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`error`] - インフラ層エラー定義
//! - [`identity_provider`] - ID プロバイダ（Cognito）
//! - [`registry`] - CPF 照会 API クライアント
//! - [`token`] - トークン署名
//! - [`password`] - ランダムパスワード生成

pub mod error;
pub mod identity_provider;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod password;
pub mod registry;
pub mod token;

pub use error::{InfraError, InfraErrorKind};
pub use identity_provider::{AuthTokens, CognitoIdentityProvider, IdentityProvider};
pub use password::{PasswordGenerator, RandomPasswordGenerator};
pub use registry::{HttpRegistryClient, RegistryClient, RegistryRecord};
pub use token::{Hs256TokenSigner, RegistryClaims, TokenSigner};
