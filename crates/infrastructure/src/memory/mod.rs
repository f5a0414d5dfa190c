//! 进程内存储
//!
//! 每个存储独占自己的状态并用 `tokio::sync::RwLock` 串行化修改，
//! 重启后数据丢失。

mod account_repository;
mod message_repository;
mod room_repository;

pub use account_repository::InMemoryAccountRepository;
pub use message_repository::InMemoryMessageRepository;
pub use room_repository::InMemoryRoomRepository;
