use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::value_objects::{AccountId, RoomId};

/// 聊天室。
///
/// 不变量：创建者始终是成员。成员集合只能通过存储层的原子更新修改。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub creator: AccountId,
    pub members: BTreeSet<AccountId>,
}

impl Room {
    pub fn new(id: RoomId, creator: AccountId) -> Self {
        let members = BTreeSet::from([creator.clone()]);
        Self {
            id,
            creator,
            members,
        }
    }

    pub fn is_member(&self, account_id: &AccountId) -> bool {
        self.members.contains(account_id)
    }

    /// 合并新成员，已存在的成员不会重复。
    pub fn add_members<'a>(&mut self, members: impl IntoIterator<Item = &'a AccountId>) {
        self.members.extend(members.into_iter().cloned());
    }

    /// 移除成员；移除非成员是空操作，创建者不会被移除。
    pub fn remove_members<'a>(&mut self, members: impl IntoIterator<Item = &'a AccountId>) {
        for member in members {
            if *member != self.creator {
                self.members.remove(member);
            }
        }
    }
}
