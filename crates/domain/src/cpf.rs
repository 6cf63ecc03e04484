//! # CPF（ブラジル個人納税者番号）
//!
//! 認証の唯一の識別子である CPF の正規化と検証を行う。
//!
//! ## 検証ルール
//!
//! | ポリシー | 11 桁 | 全桁同一を拒否 | チェックディジット |
//! |---------|-------|---------------|-------------------|
//! | [`CpfPolicy::Lenient`] | ✓ | ✓ | - |
//! | [`CpfPolicy::Strict`] | ✓ | ✓ | ✓ |
//!
//! デフォルトは `Lenient`。チェックディジット（modulo 11）を検証しないのは
//! 既存クライアントとの互換のため。`Strict` は設定で明示的に有効化する。
//!
//! ## ログ出力
//!
//! [`Cpf`] の `Debug` / `Display` は末尾 4 桁以外をマスクする。
//! 生の値が必要な箇所（ユーザー名、照会 API のパラメータ）では
//! [`Cpf::as_str`] を使う。

use std::fmt;

use crate::DomainError;

/// CPF の桁数
pub const CPF_LENGTH: usize = 11;

/// ASCII 数字以外の文字をすべて取り除く
///
/// 全角数字などの ASCII 以外の数字も取り除く。
/// 長さは検証しない。冪等（`normalize(&normalize(x)) == normalize(x)`）。
pub fn normalize(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// 末尾 4 文字以外を `*` に置き換える
///
/// ログやエラーメッセージに CPF を含める場合に使う。
pub fn mask(value: &str) -> String {
    let len = value.chars().count();
    let hidden = len.saturating_sub(4);
    value
        .chars()
        .enumerate()
        .map(|(i, c)| if i < hidden { '*' } else { c })
        .collect()
}

/// CPF の形式を検証する
///
/// 正規化後に 11 桁であり、かつ全桁が同一でないことのみを確認する。
/// チェックディジットは検証しない（[`has_valid_check_digits`] を参照）。
pub fn validate(raw: &str) -> bool {
    let digits = normalize(raw);
    digits.len() == CPF_LENGTH && !is_repeated_digit(&digits)
}

/// modulo 11 のチェックディジットを検証する
///
/// 正規化後に 11 桁でない場合は `false`。
pub fn has_valid_check_digits(raw: &str) -> bool {
    let digits: Vec<u32> = normalize(raw)
        .chars()
        .filter_map(|c| c.to_digit(10))
        .collect();
    if digits.len() != CPF_LENGTH {
        return false;
    }

    check_digit(&digits[..9]) == digits[9] && check_digit(&digits[..10]) == digits[10]
}

/// 先頭 n 桁から次のチェックディジットを計算する
///
/// 重みは `n + 1` から 2 まで降順。
fn check_digit(digits: &[u32]) -> u32 {
    let weight_start = digits.len() as u32 + 1;
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, d)| d * (weight_start - i as u32))
        .sum();
    let remainder = sum % 11;
    if remainder < 2 { 0 } else { 11 - remainder }
}

fn is_repeated_digit(digits: &str) -> bool {
    let mut chars = digits.chars();
    match chars.next() {
        Some(first) => chars.all(|c| c == first),
        None => false,
    }
}

/// CPF 検証ポリシー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CpfPolicy {
    /// 桁数と全桁同一のみ検証する
    #[default]
    Lenient,
    /// チェックディジットも検証する
    Strict,
}

impl CpfPolicy {
    /// チェックディジット検証の有無からポリシーを決定する
    pub fn from_check_digits(enabled: bool) -> Self {
        if enabled { Self::Strict } else { Self::Lenient }
    }

    /// ポリシーに従って CPF を検証する
    pub fn accepts(&self, raw: &str) -> bool {
        match self {
            Self::Lenient => validate(raw),
            Self::Strict => validate(raw) && has_valid_check_digits(raw),
        }
    }
}

/// 正規化済み CPF（値オブジェクト）
///
/// 数字のみで構成された、空でない文字列。
/// 生成経路によって保証される不変条件が異なる:
///
/// - [`Cpf::normalized`]: 数字が 1 桁以上
/// - [`Cpf::validated`]: [`CpfPolicy`] による検証済み
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Cpf(String);

impl Cpf {
    /// 正規化のみを行って CPF を作成する
    ///
    /// 桁数は検証しない。ID プロバイダのユーザー名として使うための最小限の変換。
    ///
    /// # エラー
    ///
    /// 正規化後に数字が残らない場合は `DomainError::MissingCpf` を返す。
    pub fn normalized(raw: &str) -> Result<Self, DomainError> {
        let digits = normalize(raw);
        if digits.is_empty() {
            return Err(DomainError::MissingCpf);
        }
        Ok(Self(digits))
    }

    /// 検証済みの CPF を作成する
    ///
    /// # エラー
    ///
    /// - 空文字列の場合は `DomainError::MissingCpf`
    /// - ポリシー違反の場合は `DomainError::InvalidCpf`
    pub fn validated(raw: &str, policy: CpfPolicy) -> Result<Self, DomainError> {
        if raw.is_empty() {
            return Err(DomainError::MissingCpf);
        }
        if !policy.accepts(raw) {
            return Err(DomainError::InvalidCpf);
        }
        Ok(Self(normalize(raw)))
    }

    /// 正規化済みの数字列を取得する
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 末尾 4 桁以外をマスクした文字列を返す
    pub fn masked(&self) -> String {
        mask(&self.0)
    }
}

impl fmt::Debug for Cpf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Cpf").field(&self.masked()).finish()
    }
}

impl fmt::Display for Cpf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}
