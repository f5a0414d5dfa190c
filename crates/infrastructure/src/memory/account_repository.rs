use std::collections::HashMap;

use async_trait::async_trait;
use domain::{
    Account, AccountId, AccountRepository, Login, PasswordHash, RepositoryError, RepositoryResult,
};
use tokio::sync::RwLock;

#[derive(Default)]
struct AccountState {
    by_id: HashMap<AccountId, Account>,
    id_by_login: HashMap<Login, AccountId>,
    next_id: u64,
}

/// 内存账户存储。登录名唯一性检查与插入在同一把写锁内完成。
#[derive(Default)]
pub struct InMemoryAccountRepository {
    state: RwLock<AccountState>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn create(&self, login: Login, password_hash: PasswordHash) -> RepositoryResult<Account> {
        let mut state = self.state.write().await;
        if state.id_by_login.contains_key(&login) {
            return Err(RepositoryError::Conflict);
        }

        let id = AccountId::from_sequence(state.next_id);
        state.next_id += 1;

        let account = Account::new(id.clone(), login.clone(), password_hash);
        state.id_by_login.insert(login, id.clone());
        state.by_id.insert(id, account.clone());
        Ok(account)
    }

    async fn find_by_id(&self, id: &AccountId) -> RepositoryResult<Account> {
        let state = self.state.read().await;
        state.by_id.get(id).cloned().ok_or(RepositoryError::NotFound)
    }

    async fn find_by_login(&self, login: &Login) -> RepositoryResult<Account> {
        let state = self.state.read().await;
        state
            .id_by_login
            .get(login)
            .and_then(|id| state.by_id.get(id))
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }
}
