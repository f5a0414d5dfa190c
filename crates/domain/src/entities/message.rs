use serde::{Deserialize, Serialize};

use crate::value_objects::{AccountId, MessageId, RoomId, Timestamp};

/// 房间内的消息，追加后不可修改。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub author: AccountId,
    pub room: RoomId,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: Timestamp,
    pub text: String,
}
