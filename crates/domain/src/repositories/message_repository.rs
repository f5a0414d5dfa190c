use async_trait::async_trait;

use crate::entities::Message;
use crate::value_objects::{AccountId, RoomId, Timestamp};

use super::RepositoryResult;

/// 按房间追加的消息日志
///
/// 存储本身不做成员校验，调用方负责先确认房间访问权限。
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// 追加一条消息，分配在本存储内单调递增的ID。
    async fn append(
        &self,
        author: &AccountId,
        room_id: &RoomId,
        text: &str,
        created_at: Timestamp,
    ) -> RepositoryResult<Message>;

    /// 按创建顺序（最早在前）返回房间内全部消息，没有消息时返回空列表。
    async fn list(&self, room_id: &RoomId) -> RepositoryResult<Vec<Message>>;
}
