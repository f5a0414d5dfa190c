use std::{fmt, sync::Arc};

use domain::{
    Account, AccountId, AccountRepository, DomainError, Login, Password, RepositoryError,
};

use crate::{
    error::ApplicationError, password::PasswordHasher, token::TokenService,
};

/// 登录名与明文密码，注册和登录共用。
#[derive(Clone)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

impl Credentials {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"***")
            .finish()
    }
}

pub struct AccountServiceDependencies {
    pub account_repository: Arc<dyn AccountRepository>,
    pub password_hasher: Arc<dyn PasswordHasher>,
    pub token_service: Arc<dyn TokenService>,
}

pub struct AccountService {
    deps: AccountServiceDependencies,
}

impl AccountService {
    pub fn new(deps: AccountServiceDependencies) -> Self {
        Self { deps }
    }

    /// 注册新账户。格式校验在哈希和存储之前完成。
    pub async fn create_account(
        &self,
        credentials: Credentials,
    ) -> Result<Account, ApplicationError> {
        let login = Login::parse(credentials.login)?;
        let password = Password::parse(credentials.password)?;

        let password_hash = self.deps.password_hasher.hash(&password).await?;

        let account = self
            .deps
            .account_repository
            .create(login, password_hash)
            .await
            .map_err(|err| match err {
                RepositoryError::Conflict => DomainError::DuplicateLogin.into(),
                other => ApplicationError::from(other),
            })?;

        tracing::info!(account_id = %account.id, login = %account.login, "account created");
        Ok(account)
    }

    /// 校验登录名和密码，成功后签发令牌。
    pub async fn authenticate_login(
        &self,
        credentials: Credentials,
    ) -> Result<String, ApplicationError> {
        let login = Login::parse(credentials.login)?;
        let password = Password::parse(credentials.password)?;

        let account = self
            .deps
            .account_repository
            .find_by_login(&login)
            .await
            .map_err(|err| match err {
                RepositoryError::NotFound => ApplicationError::InvalidLogin,
                other => ApplicationError::from(other),
            })?;

        let password_ok = self
            .deps
            .password_hasher
            .verify(&password, &account.password_hash)
            .await?;
        if !password_ok {
            tracing::warn!(login = %login, "login attempt with invalid password");
            return Err(ApplicationError::InvalidPassword);
        }

        let token = self.deps.token_service.issue(&account.id)?;
        tracing::info!(account_id = %account.id, "account logged in");
        Ok(token)
    }

    /// 令牌到账户ID的解析，是其它需要调用者身份的操作唯一的认证入口。
    pub fn resolve_token(&self, token: &str) -> Result<AccountId, ApplicationError> {
        Ok(self.deps.token_service.verify(token)?)
    }

    pub async fn get_account(&self, id: &AccountId) -> Result<Account, ApplicationError> {
        self.deps
            .account_repository
            .find_by_id(id)
            .await
            .map_err(|err| match err {
                RepositoryError::NotFound => DomainError::AccountNotFound.into(),
                other => ApplicationError::from(other),
            })
    }
}
