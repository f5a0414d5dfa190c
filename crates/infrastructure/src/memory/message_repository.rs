use std::collections::HashMap;

use async_trait::async_trait;
use domain::{
    AccountId, Message, MessageId, MessageRepository, RepositoryResult, RoomId, Timestamp,
};
use tokio::sync::RwLock;

#[derive(Default)]
struct MessageState {
    by_room: HashMap<RoomId, Vec<Message>>,
    next_id: u64,
}

/// 内存消息日志。ID 分配与追加在同一把写锁内完成，
/// 因此同一房间内 ID 顺序与追加顺序一致。
#[derive(Default)]
pub struct InMemoryMessageRepository {
    state: RwLock<MessageState>,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn append(
        &self,
        author: &AccountId,
        room_id: &RoomId,
        text: &str,
        created_at: Timestamp,
    ) -> RepositoryResult<Message> {
        let mut state = self.state.write().await;
        let id = MessageId::from_sequence(state.next_id);
        state.next_id += 1;

        let message = Message {
            id,
            author: author.clone(),
            room: room_id.clone(),
            created_at,
            text: text.to_owned(),
        };
        state
            .by_room
            .entry(room_id.clone())
            .or_default()
            .push(message.clone());
        Ok(message)
    }

    async fn list(&self, room_id: &RoomId) -> RepositoryResult<Vec<Message>> {
        let state = self.state.read().await;
        Ok(state.by_room.get(room_id).cloned().unwrap_or_default())
    }
}
