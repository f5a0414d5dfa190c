use std::sync::Arc;

use application::{
    AccountService, AccountServiceDependencies, Clock, MessageService, MessageServiceDependencies,
    PasswordHasher, RoomService, RoomServiceDependencies, SystemClock, TokenService,
};
use config::{AppConfig, StorageBackend, StorageConfig};
use domain::{AccountRepository, MessageRepository, RoomRepository};
use thiserror::Error;

use crate::{
    memory::{InMemoryAccountRepository, InMemoryMessageRepository, InMemoryRoomRepository},
    migrations::MIGRATOR,
    password::BcryptPasswordHasher,
    postgres::{create_pg_pool, PgStorage},
    token::{JwtTokenService, KeyError},
};

#[derive(Debug, Error)]
pub enum InfrastructureError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("signing key error: {0}")]
    Key(#[from] KeyError),
    #[error("storage.database_url is required for the postgres backend")]
    MissingDatabaseUrl,
}

/// 三个存储的组合
#[derive(Clone)]
pub struct Storage {
    pub account_repository: Arc<dyn AccountRepository>,
    pub room_repository: Arc<dyn RoomRepository>,
    pub message_repository: Arc<dyn MessageRepository>,
}

impl Storage {
    pub fn in_memory() -> Self {
        Self {
            account_repository: Arc::new(InMemoryAccountRepository::new()),
            room_repository: Arc::new(InMemoryRoomRepository::new()),
            message_repository: Arc::new(InMemoryMessageRepository::new()),
        }
    }

    pub fn postgres(storage: PgStorage) -> Self {
        Self {
            account_repository: storage.account_repository,
            room_repository: storage.room_repository,
            message_repository: storage.message_repository,
        }
    }

    /// 按配置选择后端；Postgres 后端会先执行迁移
    pub async fn connect(config: &StorageConfig) -> Result<Self, InfrastructureError> {
        match config.backend {
            StorageBackend::Memory => {
                tracing::info!("using in-memory storage");
                Ok(Self::in_memory())
            }
            StorageBackend::Postgres => {
                let url = config
                    .database_url
                    .as_deref()
                    .ok_or(InfrastructureError::MissingDatabaseUrl)?;
                let pool = create_pg_pool(url, config.max_connections).await?;
                MIGRATOR.run(&pool).await?;
                tracing::info!(max_connections = config.max_connections, "using postgres storage");
                Ok(Self::postgres(PgStorage::new(pool)))
            }
        }
    }
}

/// 组装完成的适配器集合，用于构建应用层服务
#[derive(Clone)]
pub struct Infrastructure {
    pub storage: Storage,
    pub password_hasher: Arc<dyn PasswordHasher>,
    pub token_service: Arc<dyn TokenService>,
    pub clock: Arc<dyn Clock>,
}

impl Infrastructure {
    pub fn new(
        storage: Storage,
        password_hasher: Arc<dyn PasswordHasher>,
        token_service: Arc<dyn TokenService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            storage,
            password_hasher,
            token_service,
            clock,
        }
    }

    /// 读取密钥文件、连接存储，使用系统时钟
    pub async fn connect(config: &AppConfig) -> Result<Self, InfrastructureError> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let token_service = JwtTokenService::from_rsa_pem_files(
            &config.auth.private_key_path,
            &config.auth.public_key_path,
            config.auth.issuer.clone(),
            minutes(config.auth.token_ttl_minutes),
            clock.clone(),
        )?;
        let storage = Storage::connect(&config.storage).await?;

        Ok(Self::new(
            storage,
            Arc::new(BcryptPasswordHasher::new(config.auth.bcrypt_cost)),
            Arc::new(token_service),
            clock,
        ))
    }

    pub fn account_service(&self) -> AccountService {
        AccountService::new(AccountServiceDependencies {
            account_repository: self.storage.account_repository.clone(),
            password_hasher: self.password_hasher.clone(),
            token_service: self.token_service.clone(),
        })
    }

    pub fn room_service(&self) -> RoomService {
        RoomService::new(RoomServiceDependencies {
            room_repository: self.storage.room_repository.clone(),
        })
    }

    pub fn message_service(&self) -> MessageService {
        MessageService::new(MessageServiceDependencies {
            message_repository: self.storage.message_repository.clone(),
            clock: self.clock.clone(),
        })
    }
}

fn minutes(value: u64) -> time::Duration {
    time::Duration::minutes(i64::try_from(value).unwrap_or(i64::MAX / 60))
}
