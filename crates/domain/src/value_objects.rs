use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use unicode_general_category::{get_general_category, GeneralCategory};

use crate::errors::{DomainError, FormatViolation};

/// 统一的时间戳类型。
pub type Timestamp = OffsetDateTime;

const MIN_LOGIN_LENGTH: usize = 6;
const MAX_LOGIN_LENGTH: usize = 32;
const MIN_PASSWORD_LENGTH: usize = 14;
const MAX_PASSWORD_LENGTH: usize = 48;

macro_rules! sequence_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// 由存储分配的序列号生成标识（十六进制小写）。
            pub fn from_sequence(sequence: u64) -> Self {
                Self(format!("{sequence:x}"))
            }

            /// 解析回序列号；非本存储签发的标识返回 `None`。
            pub fn sequence(&self) -> Option<u64> {
                u64::from_str_radix(&self.0, 16).ok()
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }
    };
}

sequence_id!(
    /// 账户唯一标识。
    AccountId
);
sequence_id!(
    /// 聊天室唯一标识。
    RoomId
);
sequence_id!(
    /// 消息唯一标识。
    MessageId
);

/// 经过验证的登录名：仅字母或数字，长度 6..=32 个字符。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Login(String);

impl Login {
    pub fn parse(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        check_format(
            "login",
            &value,
            |c| is_letter(c) || is_digit(c),
            MIN_LOGIN_LENGTH,
            MAX_LOGIN_LENGTH,
        )?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Login {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 经过格式校验的明文密码：字母、数字或空白，长度 14..=48 个字符。
///
/// 只在内存中短暂存在，`Debug` 输出不包含内容。
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    pub fn parse(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        check_format(
            "password",
            &value,
            |c| is_letter(c) || is_digit(c) || c.is_whitespace(),
            MIN_PASSWORD_LENGTH,
            MAX_PASSWORD_LENGTH,
        )?;
        Ok(Self(value))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// 经过外部服务生成的密码哈希。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordHash(String);

impl PasswordHash {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 字母：通用类别 Lu、Ll、Lt、Lm、Lo。
fn is_letter(c: char) -> bool {
    matches!(
        get_general_category(c),
        GeneralCategory::UppercaseLetter
            | GeneralCategory::LowercaseLetter
            | GeneralCategory::TitlecaseLetter
            | GeneralCategory::ModifierLetter
            | GeneralCategory::OtherLetter
    )
}

/// 数字：仅十进制数字 Nd。
fn is_digit(c: char) -> bool {
    get_general_category(c) == GeneralCategory::DecimalNumber
}

// 先检查字符，再检查长度；长度按字符计数而非字节。
fn check_format(
    field: &'static str,
    value: &str,
    allowed: impl Fn(char) -> bool,
    min: usize,
    max: usize,
) -> Result<(), DomainError> {
    let mut chars = 0;
    for c in value.chars() {
        if !allowed(c) {
            return Err(DomainError::invalid_format(
                field,
                FormatViolation::InvalidCharacter,
            ));
        }
        chars += 1;
    }
    if chars < min {
        return Err(DomainError::invalid_format(field, FormatViolation::TooShort));
    }
    if chars > max {
        return Err(DomainError::invalid_format(field, FormatViolation::TooLong));
    }
    Ok(())
}
