use async_trait::async_trait;

use crate::entities::Account;
use crate::value_objects::{AccountId, Login, PasswordHash};

use super::RepositoryResult;

/// 账户凭据存储
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// 保存凭据并分配新的账户ID。
    ///
    /// 登录名唯一性检查与插入是同一个原子步骤，并发重复注册只有一个成功，
    /// 其余返回 `RepositoryError::Conflict`。
    async fn create(&self, login: Login, password_hash: PasswordHash)
        -> RepositoryResult<Account>;

    /// 根据ID查找账户，不存在时返回 `RepositoryError::NotFound`
    async fn find_by_id(&self, id: &AccountId) -> RepositoryResult<Account>;

    /// 根据登录名查找账户，不存在时返回 `RepositoryError::NotFound`
    async fn find_by_login(&self, login: &Login) -> RepositoryResult<Account>;
}
