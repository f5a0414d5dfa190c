//! 领域实体定义
//!
//! 包含系统的核心实体：账户、聊天室、消息。

pub mod account;
pub mod message;
pub mod room;

pub use account::Account;
pub use message::Message;
pub use room::Room;
