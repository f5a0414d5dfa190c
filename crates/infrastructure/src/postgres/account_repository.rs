use async_trait::async_trait;
use domain::{
    Account, AccountId, AccountRepository, Login, PasswordHash, RepositoryError, RepositoryResult,
};
use sqlx::{FromRow, PgPool};

use super::{invalid_data, key_for_db, map_sqlx_err, sequence_from_db};

#[derive(Debug, FromRow)]
struct AccountRecord {
    id: i64,
    login: String,
    password_hash: String,
}

impl TryFrom<AccountRecord> for Account {
    type Error = RepositoryError;

    fn try_from(value: AccountRecord) -> Result<Self, Self::Error> {
        let login = Login::parse(value.login).map_err(|err| invalid_data(err.to_string()))?;
        Ok(Account::new(
            AccountId::from_sequence(sequence_from_db(value.id)?),
            login,
            PasswordHash::new(value.password_hash),
        ))
    }
}

#[derive(Clone)]
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    async fn create(&self, login: Login, password_hash: PasswordHash) -> RepositoryResult<Account> {
        let record = sqlx::query_as::<_, AccountRecord>(
            r#"
            INSERT INTO accounts (login, password_hash)
            VALUES ($1, $2)
            RETURNING id, login, password_hash
            "#,
        )
        .bind(login.as_str())
        .bind(password_hash.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match err {
            // 唯一约束兜底并发重复注册
            sqlx::Error::Database(db) if db.is_unique_violation() => RepositoryError::Conflict,
            other => map_sqlx_err(other),
        })?;

        Account::try_from(record)
    }

    async fn find_by_id(&self, id: &AccountId) -> RepositoryResult<Account> {
        let Some(key) = key_for_db(id.sequence()) else {
            return Err(RepositoryError::NotFound);
        };

        let record = sqlx::query_as::<_, AccountRecord>(
            "SELECT id, login, password_hash FROM accounts WHERE id = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        record
            .map(Account::try_from)
            .transpose()?
            .ok_or(RepositoryError::NotFound)
    }

    async fn find_by_login(&self, login: &Login) -> RepositoryResult<Account> {
        let record = sqlx::query_as::<_, AccountRecord>(
            "SELECT id, login, password_hash FROM accounts WHERE login = $1",
        )
        .bind(login.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        record
            .map(Account::try_from)
            .transpose()?
            .ok_or(RepositoryError::NotFound)
    }
}
