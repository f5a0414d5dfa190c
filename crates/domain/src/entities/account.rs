use serde::{Deserialize, Serialize};

use crate::value_objects::{AccountId, Login, PasswordHash};

/// 账户：创建后不可变，也没有删除路径。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub login: Login,
    #[serde(skip_serializing)] // 密码哈希不暴露给客户端
    pub password_hash: PasswordHash,
}

impl Account {
    pub fn new(id: AccountId, login: Login, password_hash: PasswordHash) -> Self {
        Self {
            id,
            login,
            password_hash,
        }
    }
}
