use std::sync::Arc;

use domain::{
    AccountId, DomainError, DomainResult, RepositoryError, Room, RoomId, RoomRepository,
};

use crate::error::ApplicationError;

pub struct RoomServiceDependencies {
    pub room_repository: Arc<dyn RoomRepository>,
}

pub struct RoomService {
    deps: RoomServiceDependencies,
}

impl RoomService {
    pub fn new(deps: RoomServiceDependencies) -> Self {
        Self { deps }
    }

    pub async fn create_room(&self, creator: &AccountId) -> Result<Room, ApplicationError> {
        let room = self
            .deps
            .room_repository
            .create(creator)
            .await
            .map_err(room_error)?;

        tracing::info!(room_id = %room.id, creator = %creator, "room created");
        Ok(room)
    }

    /// 读取房间。房间不存在与非成员访问在这里仍可区分，
    /// 对外是否合并成同一种信号由接入层决定。
    pub async fn get_room(
        &self,
        actor: &AccountId,
        room_id: &RoomId,
    ) -> Result<Room, ApplicationError> {
        let room = self
            .deps
            .room_repository
            .find_by_id(actor, room_id)
            .await
            .map_err(room_error)?;

        // 存储已经检查过成员身份，这里再确认一次本层的授权约定
        if !room.is_member(actor) {
            return Err(DomainError::RoomNotFound.into());
        }

        tracing::debug!(room_id = %room_id, actor = %actor, "room fetched");
        Ok(room)
    }

    pub async fn list_rooms(&self, account_id: &AccountId) -> Result<Vec<Room>, ApplicationError> {
        let rooms = self
            .deps
            .room_repository
            .list_for_account(account_id)
            .await?;
        Ok(rooms)
    }

    /// 在一次原子更新中把 `members` 并入成员集合，已存在的成员不会重复。
    pub async fn add_members(
        &self,
        actor: &AccountId,
        room_id: &RoomId,
        members: &[AccountId],
    ) -> Result<(), ApplicationError> {
        let authorized_actor = actor.clone();
        let members = members.to_vec();
        let room = self
            .deps
            .room_repository
            .update(
                actor,
                room_id,
                Box::new(move |mut room: Room| {
                    authorize(&authorized_actor, &room)?;
                    room.add_members(&members);
                    Ok(room)
                }),
            )
            .await
            .map_err(room_error)?;

        tracing::info!(room_id = %room.id, actor = %actor, members = room.members.len(), "room members added");
        Ok(())
    }

    /// 在一次原子更新中移除 `members`；非成员忽略，创建者保留。
    pub async fn remove_members(
        &self,
        actor: &AccountId,
        room_id: &RoomId,
        members: &[AccountId],
    ) -> Result<(), ApplicationError> {
        let authorized_actor = actor.clone();
        let members = members.to_vec();
        let room = self
            .deps
            .room_repository
            .update(
                actor,
                room_id,
                Box::new(move |mut room: Room| {
                    authorize(&authorized_actor, &room)?;
                    room.remove_members(&members);
                    Ok(room)
                }),
            )
            .await
            .map_err(room_error)?;

        tracing::info!(room_id = %room.id, actor = %actor, members = room.members.len(), "room members removed");
        Ok(())
    }

    /// 先添加再移除，两步是两次独立的原子更新。
    ///
    /// 第二步失败时第一步的结果不会回滚，调用方需要把部分生效视为可能的结果。
    pub async fn update_members(
        &self,
        actor: &AccountId,
        room_id: &RoomId,
        add: &[AccountId],
        remove: &[AccountId],
    ) -> Result<(), ApplicationError> {
        self.add_members(actor, room_id, add).await?;
        if let Err(err) = self.remove_members(actor, room_id, remove).await {
            tracing::warn!(room_id = %room_id, actor = %actor, error = %err, "member removal failed after additions were committed");
            return Err(err);
        }
        Ok(())
    }
}

fn authorize(actor: &AccountId, room: &Room) -> DomainResult<()> {
    if room.is_member(actor) {
        Ok(())
    } else {
        Err(DomainError::NotRoomMember)
    }
}

fn room_error(err: RepositoryError) -> ApplicationError {
    match err {
        RepositoryError::NotFound => DomainError::RoomNotFound.into(),
        RepositoryError::Unauthorized => DomainError::NotRoomMember.into(),
        other => ApplicationError::from(other),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use domain::MockRoomRepository;
    use mockall::Sequence;

    fn id(value: u64) -> AccountId {
        AccountId::from_sequence(value)
    }

    fn room_of(members: &[u64]) -> Room {
        let mut room = Room::new(RoomId::from_sequence(0), id(members[0]));
        room.add_members(&members.iter().map(|m| id(*m)).collect::<Vec<_>>());
        room
    }

    fn service(repository: MockRoomRepository) -> RoomService {
        RoomService::new(RoomServiceDependencies {
            room_repository: Arc::new(repository),
        })
    }

    #[tokio::test]
    async fn get_room_keeps_absent_and_unauthorized_distinct() {
        let mut repository = MockRoomRepository::new();
        repository
            .expect_find_by_id()
            .withf(|_, room_id| room_id.as_str() == "1")
            .returning(|_, _| Err(RepositoryError::NotFound));
        repository
            .expect_find_by_id()
            .withf(|_, room_id| room_id.as_str() == "0")
            .returning(|_, _| Err(RepositoryError::Unauthorized));
        let service = service(repository);

        let absent = service
            .get_room(&id(1), &RoomId::from_sequence(1))
            .await
            .unwrap_err();
        assert!(matches!(
            absent,
            ApplicationError::Domain(DomainError::RoomNotFound)
        ));

        let foreign = service
            .get_room(&id(1), &RoomId::from_sequence(0))
            .await
            .unwrap_err();
        assert!(matches!(
            foreign,
            ApplicationError::Domain(DomainError::NotRoomMember)
        ));
    }

    #[tokio::test]
    async fn get_room_rechecks_membership_of_returned_room() {
        let mut repository = MockRoomRepository::new();
        repository
            .expect_find_by_id()
            .returning(|_, _| Ok(room_of(&[0])));

        let err = service(repository)
            .get_room(&id(5), &RoomId::from_sequence(0))
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicationError::Domain(DomainError::RoomNotFound)));
    }

    #[tokio::test]
    async fn add_members_merges_without_duplicates() {
        let committed = Arc::new(Mutex::new(None));
        let sink = committed.clone();

        let mut repository = MockRoomRepository::new();
        repository
            .expect_update()
            .times(1)
            .returning(move |_, _, update| {
                let room = update(room_of(&[0, 1])).map_err(RepositoryError::Rejected)?;
                *sink.lock().unwrap() = Some(room.clone());
                Ok(room)
            });

        service(repository)
            .add_members(&id(0), &RoomId::from_sequence(0), &[id(1), id(2), id(2)])
            .await
            .unwrap();

        let room = committed.lock().unwrap().clone().unwrap();
        assert_eq!(
            room.members.into_iter().collect::<Vec<_>>(),
            vec![id(0), id(1), id(2)]
        );
    }

    #[tokio::test]
    async fn updater_rejects_actor_that_is_no_longer_a_member() {
        let mut repository = MockRoomRepository::new();
        repository.expect_update().returning(|_, _, update| {
            // 模拟检查之后成员集合已变化的情况，直接把不含操作者的状态交给更新函数
            update(room_of(&[0])).map_err(RepositoryError::Rejected)
        });

        let err = service(repository)
            .remove_members(&id(9), &RoomId::from_sequence(0), &[id(0)])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ApplicationError::Domain(DomainError::NotRoomMember)
        ));
    }

    #[tokio::test]
    async fn remove_members_treats_non_members_as_no_op() {
        let committed = Arc::new(Mutex::new(None));
        let sink = committed.clone();

        let mut repository = MockRoomRepository::new();
        repository.expect_update().returning(move |_, _, update| {
            let room = update(room_of(&[0, 1, 2])).map_err(RepositoryError::Rejected)?;
            *sink.lock().unwrap() = Some(room.clone());
            Ok(room)
        });

        service(repository)
            .remove_members(&id(0), &RoomId::from_sequence(0), &[id(1), id(25)])
            .await
            .unwrap();

        let room = committed.lock().unwrap().clone().unwrap();
        assert_eq!(
            room.members.into_iter().collect::<Vec<_>>(),
            vec![id(0), id(2)]
        );
    }

    #[tokio::test]
    async fn update_members_leaves_additions_committed_when_removal_fails() {
        let state = Arc::new(Mutex::new(room_of(&[0, 1])));
        let first = state.clone();
        let mut seq = Sequence::new();

        let mut repository = MockRoomRepository::new();
        repository
            .expect_update()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_, _, update| {
                let current = first.lock().unwrap().clone();
                let room = update(current).map_err(RepositoryError::Rejected)?;
                *first.lock().unwrap() = room.clone();
                Ok(room)
            });
        repository
            .expect_update()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Err(RepositoryError::storage("connection reset")));

        let err = service(repository)
            .update_members(&id(0), &RoomId::from_sequence(0), &[id(2)], &[id(1)])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ApplicationError::Repository(RepositoryError::Storage { .. })
        ));
        // 第一步已经提交：新成员在，待移除的成员也还在
        let room = state.lock().unwrap().clone();
        assert!(room.is_member(&id(2)));
        assert!(room.is_member(&id(1)));
    }

    #[tokio::test]
    async fn list_rooms_returns_empty_list() {
        let mut repository = MockRoomRepository::new();
        repository
            .expect_list_for_account()
            .returning(|_| Ok(Vec::new()));

        let rooms = service(repository).list_rooms(&id(3)).await.unwrap();
        assert!(rooms.is_empty());
    }
}
