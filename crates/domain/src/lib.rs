//! 聊天系统核心领域模型
//!
//! 包含账户、聊天室、消息等核心实体，格式校验规则，以及存储接口。

pub mod entities;
pub mod errors;
pub mod repositories;
pub mod value_objects;

// 重新导出常用类型
pub use entities::*;
pub use errors::*;
pub use repositories::*;
pub use value_objects::*;
