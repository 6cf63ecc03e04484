//! # ID プロバイダ上のユーザーレコード
//!
//! ユーザーレコードはすべて ID プロバイダ（Cognito ユーザープール）が所有する。
//! このモジュールはレコードに書き込む属性と、初回作成時の方針のみを定義する。

/// CPF を保持するカスタム属性
pub const CPF_ATTRIBUTE: &str = "custom:cpf";
/// 署名済みトークンを保持するカスタム属性
pub const TOKEN_ATTRIBUTE: &str = "custom:jwtToken";
/// メールアドレス属性
pub const EMAIL_ATTRIBUTE: &str = "email";
/// メールアドレス検証済みフラグ
pub const EMAIL_VERIFIED_ATTRIBUTE: &str = "email_verified";

/// ユーザー属性（名前と値の組）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAttribute {
    pub name:  String,
    pub value: String,
}

impl UserAttribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name:  name.into(),
            value: value.into(),
        }
    }
}

/// ユーザー作成時に設定する属性を組み立てる
///
/// メールアドレスは `<username>@<email_domain>` のプレースホルダで、
/// 通知は抑止されるため実在しなくてよい。
pub fn provisioning_attributes(username: &str, email_domain: &str) -> Vec<UserAttribute> {
    vec![
        UserAttribute::new(CPF_ATTRIBUTE, username),
        UserAttribute::new(EMAIL_ATTRIBUTE, format!("{username}@{email_domain}")),
        UserAttribute::new(EMAIL_VERIFIED_ATTRIBUTE, "true"),
    ]
}

/// 初回認証時のユーザー作成方針
///
/// 1 つのプロセス内では常にどちらか一方のみを使う。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display, strum::EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum ProvisioningPolicy {
    /// パスワードを設定しない（パスワードレスのカスタム認証フローに依存）
    #[default]
    Passwordless,
    /// ランダムな一時パスワードで作成し、別のランダムパスワードを恒久設定する
    RandomPassword,
}
