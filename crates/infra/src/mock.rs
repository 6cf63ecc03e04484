//! # テスト用モック
//!
//! ユースケーステストで使用する ID プロバイダ・照会 API・署名器のモック。
//! 呼び出しを記録し、呼び出し回数や引数を検証できる。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! cpfgate-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use cpfgate_domain::{cpf::Cpf, identity::UserAttribute};

use crate::{
    InfraError,
    identity_provider::{AuthTokens, IdentityProvider},
    password::PasswordGenerator,
    registry::{RegistryClient, RegistryRecord},
    token::{RegistryClaims, TokenSigner},
};

// ===== MockIdentityProvider =====

/// ID プロバイダへの呼び出し記録
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityProviderCall {
    InitiateCustomAuth {
        username: String,
    },
    CreateUser {
        username:           String,
        attributes:         Vec<UserAttribute>,
        temporary_password: Option<String>,
    },
    SetPermanentPassword {
        username: String,
        password: String,
    },
    UpdateUserAttributes {
        username:   String,
        attributes: Vec<UserAttribute>,
    },
}

/// インメモリのユーザープール
///
/// 存在するユーザーに対してのみ認証・属性更新が成功する。
/// `fail_*` で特定の操作を常に失敗させられる。
#[derive(Clone, Default)]
pub struct MockIdentityProvider {
    users:              Arc<Mutex<HashMap<String, Vec<UserAttribute>>>>,
    calls:              Arc<Mutex<Vec<IdentityProviderCall>>>,
    auth_errors:        Arc<Mutex<VecDeque<String>>>,
    failing_operations: Arc<Mutex<HashSet<&'static str>>>,
}

impl MockIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// 既存ユーザーを登録する
    pub fn add_user(&self, username: &str) {
        self.users
            .lock()
            .unwrap()
            .insert(username.to_string(), Vec::new());
    }

    /// 次回の認証開始を指定メッセージで失敗させる
    pub fn fail_next_auth(&self, message: &str) {
        self.auth_errors
            .lock()
            .unwrap()
            .push_back(message.to_string());
    }

    /// ユーザー作成を常に失敗させる
    pub fn fail_create_user(&self) {
        self.failing_operations.lock().unwrap().insert("create_user");
    }

    /// 属性更新を常に失敗させる
    pub fn fail_update_user_attributes(&self) {
        self.failing_operations
            .lock()
            .unwrap()
            .insert("update_user_attributes");
    }

    /// ユーザー作成を受け付けるが、実際には登録しない
    ///
    /// 作成直後の再試行でもユーザー不在が続くケースを再現する。
    pub fn discard_created_users(&self) {
        self.failing_operations
            .lock()
            .unwrap()
            .insert("discard_created_users");
    }

    /// 記録された呼び出しを取得する
    pub fn calls(&self) -> Vec<IdentityProviderCall> {
        self.calls.lock().unwrap().clone()
    }

    /// 指定した種類の呼び出し回数を数える
    pub fn count_calls(&self, predicate: impl Fn(&IdentityProviderCall) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| predicate(c)).count()
    }

    /// ユーザーの属性値を取得する
    pub fn attribute(&self, username: &str, name: &str) -> Option<String> {
        self.users
            .lock()
            .unwrap()
            .get(username)
            .and_then(|attrs| attrs.iter().rev().find(|a| a.name == name))
            .map(|a| a.value.clone())
    }

    fn is_failing(&self, operation: &str) -> bool {
        self.failing_operations.lock().unwrap().contains(operation)
    }

    fn record(&self, call: IdentityProviderCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn initiate_custom_auth(&self, username: &str) -> Result<AuthTokens, InfraError> {
        self.record(IdentityProviderCall::InitiateCustomAuth {
            username: username.to_string(),
        });

        if let Some(message) = self.auth_errors.lock().unwrap().pop_front() {
            return Err(InfraError::identity_provider(message));
        }
        if !self.users.lock().unwrap().contains_key(username) {
            return Err(InfraError::user_not_found(username));
        }

        Ok(AuthTokens {
            access_token: format!("access-{username}"),
            id_token:     format!("id-{username}"),
        })
    }

    async fn create_user(
        &self,
        username: &str,
        attributes: &[UserAttribute],
        temporary_password: Option<&str>,
    ) -> Result<(), InfraError> {
        self.record(IdentityProviderCall::CreateUser {
            username:           username.to_string(),
            attributes:         attributes.to_vec(),
            temporary_password: temporary_password.map(str::to_string),
        });

        if self.is_failing("create_user") {
            return Err(InfraError::identity_provider("ユーザーの作成に失敗"));
        }
        if !self.is_failing("discard_created_users") {
            self.users
                .lock()
                .unwrap()
                .entry(username.to_string())
                .or_insert_with(|| attributes.to_vec());
        }
        Ok(())
    }

    async fn set_permanent_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(), InfraError> {
        self.record(IdentityProviderCall::SetPermanentPassword {
            username: username.to_string(),
            password: password.to_string(),
        });

        if !self.users.lock().unwrap().contains_key(username) {
            return Err(InfraError::user_not_found(username));
        }
        Ok(())
    }

    async fn update_user_attributes(
        &self,
        username: &str,
        attributes: &[UserAttribute],
    ) -> Result<(), InfraError> {
        self.record(IdentityProviderCall::UpdateUserAttributes {
            username:   username.to_string(),
            attributes: attributes.to_vec(),
        });

        if self.is_failing("update_user_attributes") {
            return Err(InfraError::identity_provider("ユーザー属性の更新に失敗"));
        }
        let mut users = self.users.lock().unwrap();
        let Some(existing) = users.get_mut(username) else {
            return Err(InfraError::user_not_found(username));
        };
        existing.extend_from_slice(attributes);
        Ok(())
    }
}

// ===== MockRegistryClient =====

/// 照会 API のモック
///
/// 登録済みの CPF には `Some`、未登録には `None`、`fail_with` 指定時はエラーを返す。
#[derive(Clone, Default)]
pub struct MockRegistryClient {
    records: Arc<Mutex<HashMap<String, String>>>,
    error:   Arc<Mutex<Option<String>>>,
    lookups: Arc<Mutex<Vec<String>>>,
}

impl MockRegistryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登録済みの CPF を追加する
    pub fn add_record(&self, cpf: &str, name: &str) {
        self.records
            .lock()
            .unwrap()
            .insert(cpf.to_string(), name.to_string());
    }

    /// すべての照会をエラーにする
    pub fn fail_with(&self, message: &str) {
        *self.error.lock().unwrap() = Some(message.to_string());
    }

    /// 照会された CPF の一覧
    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl RegistryClient for MockRegistryClient {
    async fn lookup(&self, cpf: &Cpf) -> Result<Option<RegistryRecord>, InfraError> {
        self.lookups.lock().unwrap().push(cpf.as_str().to_string());

        if let Some(message) = self.error.lock().unwrap().clone() {
            return Err(InfraError::registry(message));
        }
        Ok(self
            .records
            .lock()
            .unwrap()
            .get(cpf.as_str())
            .map(|name| RegistryRecord {
                name: name.clone(),
                cpf:  cpf.as_str().to_string(),
            }))
    }
}

// ===== MockTokenSigner / MockPasswordGenerator =====

/// 署名せずにクレームを連結した文字列を返す署名器
#[derive(Clone, Default)]
pub struct MockTokenSigner;

impl TokenSigner for MockTokenSigner {
    fn sign(&self, claims: &RegistryClaims) -> Result<String, InfraError> {
        Ok(format!("signed.{}.{}", claims.cpf, claims.name))
    }
}

/// 呼び出しごとに連番のパスワードを返す生成器
#[derive(Clone, Default)]
pub struct MockPasswordGenerator {
    counter: Arc<Mutex<u32>>,
}

impl PasswordGenerator for MockPasswordGenerator {
    fn generate(&self) -> String {
        let mut counter = self.counter.lock().unwrap();
        *counter += 1;
        format!("Passw0rd!{counter}")
    }
}
