use domain::AccountId;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("invalid token")]
    InvalidToken,
    #[error("token expired")]
    Expired,
    #[error("token signing failed: {0}")]
    Signing(String),
}

/// 签发与校验带时限的身份令牌。
///
/// 校验是无状态的：只依赖签名和过期时间，不查询任何存储。
#[cfg_attr(test, mockall::automock)]
pub trait TokenService: Send + Sync {
    /// 为账户签发令牌，有效期从签发时刻起算。
    fn issue(&self, account_id: &AccountId) -> Result<String, TokenError>;

    /// 校验令牌并返回其中的账户ID。过期时间以校验时的当前时间判断。
    fn verify(&self, token: &str) -> Result<AccountId, TokenError>;
}
