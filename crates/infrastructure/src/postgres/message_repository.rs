use async_trait::async_trait;
use domain::{
    AccountId, Message, MessageId, MessageRepository, RepositoryError, RepositoryResult, RoomId,
    Timestamp,
};
use sqlx::{FromRow, PgPool};

use super::{invalid_data, key_for_db, map_sqlx_err, sequence_from_db};

#[derive(Debug, FromRow)]
struct MessageRecord {
    id: i64,
    room_id: i64,
    author_id: i64,
    text: String,
    created_at: Timestamp,
}

impl TryFrom<MessageRecord> for Message {
    type Error = RepositoryError;

    fn try_from(value: MessageRecord) -> Result<Self, Self::Error> {
        Ok(Message {
            id: MessageId::from_sequence(sequence_from_db(value.id)?),
            author: AccountId::from_sequence(sequence_from_db(value.author_id)?),
            room: RoomId::from_sequence(sequence_from_db(value.room_id)?),
            created_at: value.created_at,
            text: value.text,
        })
    }
}

#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    async fn append(
        &self,
        author: &AccountId,
        room_id: &RoomId,
        text: &str,
        created_at: Timestamp,
    ) -> RepositoryResult<Message> {
        let author_key = key_for_db(author.sequence())
            .ok_or_else(|| invalid_data(format!("unknown author id {author}")))?;
        let room_key = key_for_db(room_id.sequence())
            .ok_or_else(|| invalid_data(format!("unknown room id {room_id}")))?;

        let record = sqlx::query_as::<_, MessageRecord>(
            r#"
            INSERT INTO messages (room_id, author_id, text, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, room_id, author_id, text, created_at
            "#,
        )
        .bind(room_key)
        .bind(author_key)
        .bind(text)
        .bind(created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Message::try_from(record)
    }

    async fn list(&self, room_id: &RoomId) -> RepositoryResult<Vec<Message>> {
        let Some(room_key) = key_for_db(room_id.sequence()) else {
            return Ok(Vec::new());
        };

        let records = sqlx::query_as::<_, MessageRecord>(
            r#"
            SELECT id, room_id, author_id, text, created_at
            FROM messages
            WHERE room_id = $1
            ORDER BY id
            "#,
        )
        .bind(room_key)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        records.into_iter().map(Message::try_from).collect()
    }
}
