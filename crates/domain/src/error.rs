//! # ドメイン層エラー定義
//!
//! 入力値がドメインルールに違反した場合のエラー型。
//!
//! ## エラーの種類と HTTP ステータスの対応
//!
//! | エラー種別 | HTTP ステータス | 用途 |
//! |-----------|----------------|------|
//! | `MissingCpf` | 400 Bad Request | CPF が未指定、または数字を含まない |
//! | `InvalidCpf` | 401 Unauthorized | CPF の形式が不正 |
//!
//! ステータスへの変換はゲートウェイ層の責務。

use thiserror::Error;

/// ドメイン層で発生するエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// CPF が指定されていない
    ///
    /// 空文字列、または正規化後に数字が 1 つも残らない場合も含む。
    #[error("CPF not provided")]
    MissingCpf,

    /// CPF の形式が不正
    ///
    /// 11 桁でない、全桁同一、厳格モードでチェックディジット不一致のいずれか。
    #[error("Invalid CPF")]
    InvalidCpf,
}
