//! 领域模型错误定义
//!
//! 定义了系统中所有可能的错误类型，提供清晰的错误上下文。

use std::fmt;

use thiserror::Error;

/// 格式校验失败的具体原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatViolation {
    /// 包含不允许的字符
    InvalidCharacter,
    /// 长度不足
    TooShort,
    /// 长度超限
    TooLong,
}

impl fmt::Display for FormatViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatViolation::InvalidCharacter => f.write_str("contains invalid character"),
            FormatViolation::TooShort => f.write_str("too short"),
            FormatViolation::TooLong => f.write_str("too long"),
        }
    }
}

/// 领域模型错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// 输入格式错误
    #[error("invalid {field}: {reason}")]
    InvalidFormat {
        field: &'static str,
        reason: FormatViolation,
    },

    /// 登录名已被占用
    #[error("login already taken")]
    DuplicateLogin,

    /// 账户不存在
    #[error("account not found")]
    AccountNotFound,

    /// 房间不存在
    #[error("room not found")]
    RoomNotFound,

    /// 操作者不是房间成员
    #[error("actor is not a member of the room")]
    NotRoomMember,
}

impl DomainError {
    /// 创建格式错误
    pub fn invalid_format(field: &'static str, reason: FormatViolation) -> Self {
        Self::InvalidFormat { field, reason }
    }
}

/// 存储层错误
///
/// `Rejected` 携带房间更新函数返回的领域错误，存储层原样透传。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("actor is not authorized for this record")]
    Unauthorized,
    #[error("record conflicts with an existing one")]
    Conflict,
    #[error("update rejected: {0}")]
    Rejected(DomainError),
    #[error("storage error: {message}")]
    Storage { message: String },
}

impl RepositoryError {
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}

/// 领域模型结果类型
pub type DomainResult<T> = Result<T, DomainError>;
