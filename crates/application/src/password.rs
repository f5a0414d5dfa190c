use async_trait::async_trait;
use domain::{Password, PasswordHash};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordHasherError {
    #[error("hash error: {0}")]
    Hash(String),
    #[error("verify error: {0}")]
    Verify(String),
}

impl PasswordHasherError {
    pub fn hash_error(message: impl Into<String>) -> Self {
        Self::Hash(message.into())
    }

    pub fn verify_error(message: impl Into<String>) -> Self {
        Self::Verify(message.into())
    }
}

/// 慢速、加盐、单向的密码哈希。`verify` 必须使用恒定时间比较。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    async fn hash(&self, password: &Password) -> Result<PasswordHash, PasswordHasherError>;
    async fn verify(
        &self,
        password: &Password,
        hashed: &PasswordHash,
    ) -> Result<bool, PasswordHasherError>;
}
