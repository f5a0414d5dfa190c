use std::sync::Arc;

use application::{AccountService, MessageService, RoomService};
use infrastructure::Infrastructure;

#[derive(Clone)]
pub struct AppState {
    pub account_service: Arc<AccountService>,
    pub room_service: Arc<RoomService>,
    pub message_service: Arc<MessageService>,
}

impl AppState {
    pub fn new(
        account_service: Arc<AccountService>,
        room_service: Arc<RoomService>,
        message_service: Arc<MessageService>,
    ) -> Self {
        Self {
            account_service,
            room_service,
            message_service,
        }
    }

    pub fn from_infrastructure(infrastructure: &Infrastructure) -> Self {
        Self::new(
            Arc::new(infrastructure.account_service()),
            Arc::new(infrastructure.room_service()),
            Arc::new(infrastructure.message_service()),
        )
    }
}
