//! # トークン署名
//!
//! 照会済みの登録情報から HS256 署名付きトークンを発行する。
//!
//! クレームは `name` と `cpf` のみで、`exp` / `aud` / `iss` は含めない。
//! 署名鍵は外部から供給される共有シークレット。

use jsonwebtoken::{EncodingKey, Header, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::InfraError;

/// 署名対象のクレーム
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryClaims {
    pub name: String,
    pub cpf:  String,
}

/// 署名付きトークンの発行を担当するトレイト
pub trait TokenSigner: Send + Sync {
    /// クレームに署名し、コンパクト形式のトークンを返す
    fn sign(&self, claims: &RegistryClaims) -> Result<String, InfraError>;
}

/// HS256 による [`TokenSigner`] の実装
pub struct Hs256TokenSigner {
    encoding_key: EncodingKey,
}

impl Hs256TokenSigner {
    pub fn new(secret: &SecretString) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.expose_secret().as_bytes()),
        }
    }
}

impl TokenSigner for Hs256TokenSigner {
    fn sign(&self, claims: &RegistryClaims) -> Result<String, InfraError> {
        Ok(encode(&Header::default(), claims, &self.encoding_key)?)
    }
}
