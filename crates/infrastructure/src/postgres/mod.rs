//! Postgres 存储
//!
//! 表结构见工作区根目录的 `migrations/`。ID 列为 `BIGSERIAL`，
//! 对外以十六进制序号字符串呈现，与内存存储一致。

mod account_repository;
mod message_repository;
mod room_repository;

use std::sync::Arc;

use domain::{RepositoryError, RepositoryResult};
use sqlx::{postgres::PgPoolOptions, PgPool};

pub use account_repository::PgAccountRepository;
pub use message_repository::PgMessageRepository;
pub use room_repository::PgRoomRepository;

fn map_sqlx_err(err: sqlx::Error) -> RepositoryError {
    RepositoryError::storage(err.to_string())
}

fn invalid_data(message: impl Into<String>) -> RepositoryError {
    RepositoryError::storage(message)
}

/// 数据库中的 `BIGINT` 主键转换为序号
fn sequence_from_db(value: i64) -> RepositoryResult<u64> {
    u64::try_from(value).map_err(|_| invalid_data(format!("negative identifier {value}")))
}

/// 序号转换为数据库主键；不是本存储签发的标识返回 `None`
fn key_for_db(sequence: Option<u64>) -> Option<i64> {
    sequence.and_then(|value| i64::try_from(value).ok())
}

#[derive(Clone)]
pub struct PgStorage {
    pub account_repository: Arc<PgAccountRepository>,
    pub room_repository: Arc<PgRoomRepository>,
    pub message_repository: Arc<PgMessageRepository>,
}

impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        Self {
            account_repository: Arc::new(PgAccountRepository::new(pool.clone())),
            room_repository: Arc::new(PgRoomRepository::new(pool.clone())),
            message_repository: Arc::new(PgMessageRepository::new(pool)),
        }
    }
}

pub async fn create_pg_pool(
    database_url: &str,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}
