use async_trait::async_trait;

use crate::entities::Room;
use crate::errors::DomainResult;
use crate::value_objects::{AccountId, RoomId};

use super::RepositoryResult;

/// 房间更新函数：接收当前状态，返回新状态或拒绝原因。
pub type RoomUpdate = Box<dyn FnOnce(Room) -> DomainResult<Room> + Send>;

/// 房间存储
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// 创建房间，成员初始只有创建者。
    async fn create(&self, creator: &AccountId) -> RepositoryResult<Room>;

    /// 读取房间。房间不存在返回 `NotFound`，操作者不是成员返回 `Unauthorized`。
    async fn find_by_id(&self, actor: &AccountId, room_id: &RoomId) -> RepositoryResult<Room>;

    /// 对单个房间执行原子的读-检查-修改-写回。
    ///
    /// 成员检查、调用 `update`、提交结果三步之间不会穿插同一房间的其它修改。
    /// 房间不存在返回 `NotFound`，操作者不是成员返回 `Unauthorized`，
    /// `update` 失败时返回 `Rejected` 且不写入任何内容。
    /// 提交时同步维护每个账户的房间索引。
    async fn update(
        &self,
        actor: &AccountId,
        room_id: &RoomId,
        update: RoomUpdate,
    ) -> RepositoryResult<Room>;

    /// 列出账户所在的全部房间，按房间ID序号排序；没有时返回空列表。
    async fn list_for_account(&self, account_id: &AccountId) -> RepositoryResult<Vec<Room>>;
}
