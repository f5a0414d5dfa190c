//! 应用层实现。
//!
//! 这里提供围绕领域模型的用例服务，处理输入校验、成员授权，
//! 以及对外部适配器（例如密码哈希、令牌签发、时钟）的抽象。
//! 服务本身不持有可变状态，所有共享状态都在存储中。

pub mod clock;
pub mod error;
pub mod password;
pub mod services;
pub mod token;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::ApplicationError;
pub use password::{PasswordHasher, PasswordHasherError};
pub use services::{
    AccountService, AccountServiceDependencies, Credentials, MessageService, MessageServiceDependencies,
    RoomService, RoomServiceDependencies,
};
pub use token::{TokenError, TokenService};
