use std::{
    collections::{BTreeSet, HashMap},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use domain::{
    AccountId, RepositoryError, RepositoryResult, Room, RoomId, RoomRepository, RoomUpdate,
};
use tokio::sync::RwLock;

/// 内存房间存储。
///
/// 每个房间有自己的读写锁，`update` 持有该房间的写锁完成
/// 成员检查、调用更新函数、写回以及索引同步，不同房间的更新互不阻塞。
///
/// 加锁顺序固定为 房间表 -> 单个房间 -> 账户索引；房间表的锁在取到房间句柄后立即释放。
#[derive(Default)]
pub struct InMemoryRoomRepository {
    rooms: RwLock<HashMap<RoomId, Arc<RwLock<Room>>>>,
    rooms_by_account: RwLock<HashMap<AccountId, BTreeSet<RoomId>>>,
    next_id: AtomicU64,
}

impl InMemoryRoomRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn room(&self, room_id: &RoomId) -> RepositoryResult<Arc<RwLock<Room>>> {
        let rooms = self.rooms.read().await;
        rooms.get(room_id).cloned().ok_or(RepositoryError::NotFound)
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn create(&self, creator: &AccountId) -> RepositoryResult<Room> {
        let id = RoomId::from_sequence(self.next_id.fetch_add(1, Ordering::Relaxed));
        let room = Room::new(id.clone(), creator.clone());

        self.rooms
            .write()
            .await
            .insert(id.clone(), Arc::new(RwLock::new(room.clone())));
        self.rooms_by_account
            .write()
            .await
            .entry(creator.clone())
            .or_default()
            .insert(id);

        Ok(room)
    }

    async fn find_by_id(&self, actor: &AccountId, room_id: &RoomId) -> RepositoryResult<Room> {
        let room = self.room(room_id).await?;
        let room = room.read().await;
        if !room.is_member(actor) {
            return Err(RepositoryError::Unauthorized);
        }
        Ok(room.clone())
    }

    async fn update(
        &self,
        actor: &AccountId,
        room_id: &RoomId,
        update: RoomUpdate,
    ) -> RepositoryResult<Room> {
        let handle = self.room(room_id).await?;
        let mut current = handle.write().await;
        if !current.is_member(actor) {
            return Err(RepositoryError::Unauthorized);
        }

        let updated = update(current.clone()).map_err(RepositoryError::Rejected)?;
        if updated.id != current.id || updated.creator != current.creator {
            return Err(RepositoryError::storage("room update changed room identity"));
        }

        {
            let mut index = self.rooms_by_account.write().await;
            for added in updated.members.difference(&current.members) {
                index
                    .entry(added.clone())
                    .or_default()
                    .insert(room_id.clone());
            }
            for removed in current.members.difference(&updated.members) {
                if let Some(rooms) = index.get_mut(removed) {
                    rooms.remove(room_id);
                    if rooms.is_empty() {
                        index.remove(removed);
                    }
                }
            }
        }

        *current = updated.clone();
        Ok(updated)
    }

    async fn list_for_account(&self, account_id: &AccountId) -> RepositoryResult<Vec<Room>> {
        let room_ids = {
            let index = self.rooms_by_account.read().await;
            index.get(account_id).cloned().unwrap_or_default()
        };

        let mut rooms = Vec::with_capacity(room_ids.len());
        for room_id in room_ids {
            let Ok(handle) = self.room(&room_id).await else {
                continue;
            };
            let room = handle.read().await;
            // 索引读取之后成员可能已变化，以房间当前状态为准
            if room.is_member(account_id) {
                rooms.push(room.clone());
            }
        }
        rooms.sort_by_key(|room| room.id.sequence());
        Ok(rooms)
    }
}
