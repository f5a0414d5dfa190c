//! 基础设施层实现。
//!
//! 提供内存与 Postgres 两套存储、bcrypt 密码哈希、RS256 令牌签发等适配器，
//! 实现应用/领域层定义的接口，并按配置组装成 [`Infrastructure`]。

pub mod builder;
pub mod memory;
pub mod migrations;
pub mod password;
pub mod postgres;
pub mod token;

pub use builder::{Infrastructure, InfrastructureError, Storage};
pub use memory::{InMemoryAccountRepository, InMemoryMessageRepository, InMemoryRoomRepository};
pub use migrations::MIGRATOR;
pub use password::BcryptPasswordHasher;
pub use postgres::{
    create_pg_pool, PgAccountRepository, PgMessageRepository, PgRoomRepository, PgStorage,
};
pub use token::{JwtTokenService, KeyError};
