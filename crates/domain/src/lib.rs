//! # cpfgate ドメイン層
//!
//! CPF 認証ゲートウェイのドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! - **値オブジェクト**: CPF は正規化済みの数字列としてのみ存在させる
//! - **純粋性**: 外部サービス（Cognito、照会 API）には一切依存しない
//! - **ドメインエラー**: 入力値の不正を表現するエラー型
//!
//! ## 依存関係の方向
//!
//! ```text
//! gateway → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`cpf`] - CPF の正規化・検証
//! - [`error`] - ドメイン層で発生するエラーの定義
//! - [`identity`] - ユーザーレコードの属性とプロビジョニング方針
//!
//! ## 使用例
//!
//! ```rust
//! use cpfgate_domain::cpf::{Cpf, CpfPolicy};
//!
//! let cpf = Cpf::validated("529.982.247-25", CpfPolicy::Lenient).unwrap();
//! assert_eq!(cpf.as_str(), "52998224725");
//! ```

pub mod cpf;
pub mod error;
pub mod identity;

pub use error::DomainError;
