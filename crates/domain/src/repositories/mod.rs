//! Repository接口定义
//!
//! 定义数据访问层的抽象接口，遵循清洁架构原则，内层定义接口，外层实现接口。
//! 每个存储独占自己的状态，并负责串行化对自身状态的并发修改。

pub mod account_repository;
pub mod message_repository;
pub mod room_repository;

pub use account_repository::AccountRepository;
pub use message_repository::MessageRepository;
pub use room_repository::{RoomRepository, RoomUpdate};

#[cfg(feature = "testing")]
pub use account_repository::MockAccountRepository;
#[cfg(feature = "testing")]
pub use message_repository::MockMessageRepository;
#[cfg(feature = "testing")]
pub use room_repository::MockRoomRepository;

use crate::errors::RepositoryError;

pub type RepositoryResult<T> = Result<T, RepositoryError>;
