#![allow(dead_code)]

use std::sync::Arc;

use application::{
    AccountService, Clock, Credentials, ManualClock, MessageService, RoomService,
};
use domain::AccountId;
use infrastructure::{BcryptPasswordHasher, Infrastructure, JwtTokenService, Storage};
use time::macros::datetime;

pub const PRIVATE_KEY: &str = include_str!("../../testdata/app.rsa");
pub const PUBLIC_KEY: &str = include_str!("../../testdata/app.rsa.pub");
pub const PASSWORD: &str = "correct horse battery";

pub struct Harness {
    pub clock: Arc<ManualClock>,
    pub accounts: AccountService,
    pub rooms: RoomService,
    pub messages: MessageService,
}

/// 内存存储、最低强度的 bcrypt 和手动时钟
pub fn harness() -> Harness {
    let clock = Arc::new(ManualClock::new(datetime!(2020-01-01 00:00 UTC)));
    let dyn_clock: Arc<dyn Clock> = clock.clone();
    let token_service = JwtTokenService::from_rsa_pem(
        PRIVATE_KEY.as_bytes(),
        PUBLIC_KEY.as_bytes(),
        "chat",
        time::Duration::minutes(100),
        dyn_clock.clone(),
    )
    .expect("test keys");

    let infrastructure = Infrastructure::new(
        Storage::in_memory(),
        Arc::new(BcryptPasswordHasher::new(4)),
        Arc::new(token_service),
        dyn_clock,
    );

    Harness {
        clock,
        accounts: infrastructure.account_service(),
        rooms: infrastructure.room_service(),
        messages: infrastructure.message_service(),
    }
}

impl Harness {
    pub async fn signup(&self, login: &str) -> AccountId {
        self.accounts
            .create_account(Credentials::new(login, PASSWORD))
            .await
            .expect("create account")
            .id
    }
}
