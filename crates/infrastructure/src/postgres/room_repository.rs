use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use domain::{
    AccountId, DomainError, RepositoryError, RepositoryResult, Room, RoomId, RoomRepository,
    RoomUpdate,
};
use sqlx::{PgConnection, PgPool};

use super::{key_for_db, map_sqlx_err, sequence_from_db};

#[derive(Clone)]
pub struct PgRoomRepository {
    pool: PgPool,
}

impl PgRoomRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn account_id(value: i64) -> RepositoryResult<AccountId> {
    Ok(AccountId::from_sequence(sequence_from_db(value)?))
}

fn build_room(id: i64, creator_id: i64, member_ids: &[i64]) -> RepositoryResult<Room> {
    let mut room = Room::new(
        RoomId::from_sequence(sequence_from_db(id)?),
        account_id(creator_id)?,
    );
    room.members = member_ids
        .iter()
        .map(|member| account_id(*member))
        .collect::<RepositoryResult<BTreeSet<_>>>()?;
    Ok(room)
}

/// 读取房间及其成员；`lock` 为真时对房间行加 `FOR UPDATE` 锁
async fn load_room(conn: &mut PgConnection, key: i64, lock: bool) -> RepositoryResult<Room> {
    let query = if lock {
        "SELECT id, creator_id FROM rooms WHERE id = $1 FOR UPDATE"
    } else {
        "SELECT id, creator_id FROM rooms WHERE id = $1"
    };
    let (id, creator_id) = sqlx::query_as::<_, (i64, i64)>(query)
        .bind(key)
        .fetch_optional(&mut *conn)
        .await
        .map_err(map_sqlx_err)?
        .ok_or(RepositoryError::NotFound)?;

    let members = sqlx::query_scalar::<_, i64>(
        "SELECT account_id FROM room_members WHERE room_id = $1 ORDER BY account_id",
    )
    .bind(key)
    .fetch_all(&mut *conn)
    .await
    .map_err(map_sqlx_err)?;

    build_room(id, creator_id, &members)
}

#[async_trait]
impl RoomRepository for PgRoomRepository {
    async fn create(&self, creator: &AccountId) -> RepositoryResult<Room> {
        let creator_key = key_for_db(creator.sequence())
            .ok_or_else(|| RepositoryError::storage(format!("unknown account id {creator}")))?;

        let mut tx = self.pool.begin().await.map_err(map_sqlx_err)?;
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO rooms (creator_id) VALUES ($1) RETURNING id",
        )
        .bind(creator_key)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_err)?;

        sqlx::query("INSERT INTO room_members (room_id, account_id) VALUES ($1, $2)")
            .bind(id)
            .bind(creator_key)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;
        tx.commit().await.map_err(map_sqlx_err)?;

        build_room(id, creator_key, &[creator_key])
    }

    async fn find_by_id(&self, actor: &AccountId, room_id: &RoomId) -> RepositoryResult<Room> {
        let key = key_for_db(room_id.sequence()).ok_or(RepositoryError::NotFound)?;
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_err)?;
        let room = load_room(&mut conn, key, false).await?;
        if !room.is_member(actor) {
            return Err(RepositoryError::Unauthorized);
        }
        Ok(room)
    }

    async fn update(
        &self,
        actor: &AccountId,
        room_id: &RoomId,
        update: RoomUpdate,
    ) -> RepositoryResult<Room> {
        let key = key_for_db(room_id.sequence()).ok_or(RepositoryError::NotFound)?;

        // 行锁持续到事务结束，同一房间的更新在此串行化；提前返回时事务随 drop 回滚
        let mut tx = self.pool.begin().await.map_err(map_sqlx_err)?;
        let current = load_room(&mut tx, key, true).await?;
        if !current.is_member(actor) {
            return Err(RepositoryError::Unauthorized);
        }

        let updated = update(current.clone()).map_err(RepositoryError::Rejected)?;
        if updated.id != current.id || updated.creator != current.creator {
            return Err(RepositoryError::storage("room update changed room identity"));
        }

        let added = updated
            .members
            .difference(&current.members)
            .map(|member| key_for_db(member.sequence()))
            .collect::<Option<Vec<_>>>()
            .ok_or(RepositoryError::Rejected(DomainError::AccountNotFound))?;
        let removed = current
            .members
            .difference(&updated.members)
            .map(|member| key_for_db(member.sequence()))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| RepositoryError::storage("stored member id is not a sequence"))?;

        if !added.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO room_members (room_id, account_id)
                SELECT $1, UNNEST($2::BIGINT[])
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(key)
            .bind(added.as_slice())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;
        }
        if !removed.is_empty() {
            sqlx::query("DELETE FROM room_members WHERE room_id = $1 AND account_id = ANY($2)")
                .bind(key)
                .bind(removed.as_slice())
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_err)?;
        }

        tx.commit().await.map_err(map_sqlx_err)?;
        Ok(updated)
    }

    async fn list_for_account(&self, account_id: &AccountId) -> RepositoryResult<Vec<Room>> {
        let Some(account_key) = key_for_db(account_id.sequence()) else {
            return Ok(Vec::new());
        };

        let rows = sqlx::query_as::<_, (i64, i64, i64)>(
            r#"
            SELECT r.id, r.creator_id, all_members.account_id
            FROM rooms r
            JOIN room_members mine ON mine.room_id = r.id AND mine.account_id = $1
            JOIN room_members all_members ON all_members.room_id = r.id
            ORDER BY r.id, all_members.account_id
            "#,
        )
        .bind(account_key)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        let mut order = Vec::new();
        let mut grouped: HashMap<i64, (i64, Vec<i64>)> = HashMap::new();
        for (room_id, creator_id, member_id) in rows {
            grouped
                .entry(room_id)
                .or_insert_with(|| {
                    order.push(room_id);
                    (creator_id, Vec::new())
                })
                .1
                .push(member_id);
        }

        order
            .into_iter()
            .filter_map(|room_id| grouped.remove(&room_id).map(|entry| (room_id, entry)))
            .map(|(room_id, (creator_id, members))| build_room(room_id, creator_id, &members))
            .collect()
    }
}
