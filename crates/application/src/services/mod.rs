mod account_service;
mod message_service;
mod room_service;

pub use account_service::{AccountService, AccountServiceDependencies, Credentials};
pub use message_service::{MessageService, MessageServiceDependencies};
pub use room_service::{RoomService, RoomServiceDependencies};
