//! # ユーザーのプロビジョニング
//!
//! ID プロバイダにユーザーが存在しない場合の作成処理。
//! 両フロー（カスタム認証・照会済み認証）で共通に使う。
//!
//! 作成方針は [`ProvisioningPolicy`] で 1 つに固定し、フローごとに変えない。

use std::sync::Arc;

use cpfgate_domain::{
    cpf::Cpf,
    identity::{ProvisioningPolicy, provisioning_attributes},
};
use cpfgate_infra::{IdentityProvider, InfraError, PasswordGenerator};

/// ユーザー作成を担当する
pub struct Provisioner {
    identity_provider:  Arc<dyn IdentityProvider>,
    password_generator: Arc<dyn PasswordGenerator>,
    policy:             ProvisioningPolicy,
    email_domain:       String,
}

impl Provisioner {
    pub fn new(
        identity_provider: Arc<dyn IdentityProvider>,
        password_generator: Arc<dyn PasswordGenerator>,
        policy: ProvisioningPolicy,
        email_domain: impl Into<String>,
    ) -> Self {
        Self {
            identity_provider,
            password_generator,
            policy,
            email_domain: email_domain.into(),
        }
    }

    /// CPF をユーザー名としてユーザーを作成する
    ///
    /// 通知メッセージは抑止する。同名ユーザーが既に存在する場合も成功扱い。
    pub async fn provision(&self, cpf: &Cpf) -> Result<(), InfraError> {
        let username = cpf.as_str();
        let attributes = provisioning_attributes(username, &self.email_domain);

        tracing::info!(cpf = %cpf, policy = %self.policy, "ユーザーを作成します");

        match self.policy {
            ProvisioningPolicy::Passwordless => {
                self.identity_provider
                    .create_user(username, &attributes, None)
                    .await
            }
            ProvisioningPolicy::RandomPassword => {
                let temporary = self.password_generator.generate();
                self.identity_provider
                    .create_user(username, &attributes, Some(&temporary))
                    .await?;

                // FORCE_CHANGE_PASSWORD 状態を解消する
                let permanent = self.password_generator.generate();
                self.identity_provider
                    .set_permanent_password(username, &permanent)
                    .await
            }
        }
    }
}
