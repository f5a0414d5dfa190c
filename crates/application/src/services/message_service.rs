use std::sync::Arc;

use domain::{AccountId, Message, MessageRepository, RoomId};

use crate::{clock::Clock, error::ApplicationError};

pub struct MessageServiceDependencies {
    pub message_repository: Arc<dyn MessageRepository>,
    pub clock: Arc<dyn Clock>,
}

/// 消息用例。
///
/// 这里不校验房间成员身份：调用方必须先通过 `RoomService::get_room` 确认访问权限。
pub struct MessageService {
    deps: MessageServiceDependencies,
}

impl MessageService {
    pub fn new(deps: MessageServiceDependencies) -> Self {
        Self { deps }
    }

    pub async fn create_message(
        &self,
        author: &AccountId,
        room_id: &RoomId,
        text: &str,
    ) -> Result<Message, ApplicationError> {
        let created_at = self.deps.clock.now();
        let message = self
            .deps
            .message_repository
            .append(author, room_id, text, created_at)
            .await?;

        tracing::info!(message_id = %message.id, room_id = %room_id, author = %author, "message created");
        Ok(message)
    }

    pub async fn list_messages(
        &self,
        actor: &AccountId,
        room_id: &RoomId,
    ) -> Result<Vec<Message>, ApplicationError> {
        let messages = self.deps.message_repository.list(room_id).await?;
        tracing::debug!(room_id = %room_id, actor = %actor, count = messages.len(), "messages listed");
        Ok(messages)
    }
}
