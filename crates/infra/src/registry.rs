//! # CPF 照会 API クライアント
//!
//! 外部の照会 API に CPF を問い合わせ、登録済みかどうかを判定する。
//!
//! ## プロトコル
//!
//! - `GET <API_URL>?cpf=<正規化済み CPF>`
//! - `200 OK` なら登録済み。本文が `{"name": "..."}` 形式なら氏名として使う
//! - `5xx`、接続失敗、タイムアウトはエラー（メッセージに URL を含めない）
//! - それ以外のステータスは未登録
//!
//! エラーを未登録として扱うかどうかはユースケース層の判断。

use std::time::Duration;

use async_trait::async_trait;
use cpfgate_domain::cpf::Cpf;
use serde::Deserialize;

use crate::InfraError;

/// 照会 API で確認できた登録情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryRecord {
    /// 氏名
    pub name: String,
    /// 正規化済み CPF
    pub cpf:  String,
}

/// 照会 API クライアントのインターフェース
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// CPF を照会する
    ///
    /// # 戻り値
    ///
    /// - `Ok(Some(record))`: 登録済み
    /// - `Ok(None)`: 未登録
    /// - `Err(InfraError)`: 通信エラーまたはサーバーエラー
    async fn lookup(&self, cpf: &Cpf) -> Result<Option<RegistryRecord>, InfraError>;
}

/// 照会 API のレスポンス本文（任意）
#[derive(Debug, Deserialize)]
struct LookupBody {
    name: Option<String>,
}

/// HTTP による [`RegistryClient`] の実装
pub struct HttpRegistryClient {
    api_url:       String,
    fallback_name: String,
    client:        reqwest::Client,
}

impl HttpRegistryClient {
    /// 新しいクライアントを作成する
    ///
    /// # 引数
    ///
    /// * `api_url` - 照会 API の URL（クエリパラメータ `cpf` が付加される）
    /// * `timeout` - リクエスト全体のタイムアウト
    /// * `fallback_name` - レスポンスに氏名が含まれない場合に使う氏名
    pub fn new(
        api_url: impl Into<String>,
        timeout: Duration,
        fallback_name: impl Into<String>,
    ) -> Result<Self, InfraError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| InfraError::unexpected(format!("HTTP クライアントの構築に失敗: {e}")))?;

        Ok(Self {
            api_url: api_url.into(),
            fallback_name: fallback_name.into(),
            client,
        })
    }

    fn name_from_body(&self, body: &str) -> String {
        serde_json::from_str::<LookupBody>(body)
            .ok()
            .and_then(|b| b.name)
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| self.fallback_name.clone())
    }
}

#[async_trait]
impl RegistryClient for HttpRegistryClient {
    async fn lookup(&self, cpf: &Cpf) -> Result<Option<RegistryRecord>, InfraError> {
        let response = self
            .client
            .get(&self.api_url)
            .query(&[("cpf", cpf.as_str())])
            .send()
            .await
            .map_err(|e| {
                // URL のクエリに CPF が含まれるためメッセージから除く
                let e = e.without_url();
                if e.is_timeout() {
                    InfraError::registry(format!("タイムアウトしました: {e}"))
                } else {
                    InfraError::registry(format!("接続に失敗: {e}"))
                }
            })?;

        match response.status() {
            reqwest::StatusCode::OK => {
                let body = response
                    .text()
                    .await
                    .map_err(|e| {
                InfraError::registry(format!("本文の読み込みに失敗: {}", e.without_url()))
            })?;
                Ok(Some(RegistryRecord {
                    name: self.name_from_body(&body),
                    cpf:  cpf.as_str().to_string(),
                }))
            }
            status if status.is_server_error() => Err(InfraError::registry(format!(
                "予期しないステータス {status}"
            ))),
            status => {
                tracing::debug!(%status, "照会 API で CPF が見つかりませんでした");
                Ok(None)
            }
        }
    }
}
