//! Web API 层。
//!
//! 提供 Axum 路由，把 HTTP 请求委托给应用层的用例服务，
//! 并把应用层错误映射为 HTTP 状态码。

mod auth;
mod error;
mod routes;
mod state;

pub use auth::AuthenticatedAccount;
pub use error::{ApiError, ErrorBody};
pub use routes::router;
pub use state::AppState;
