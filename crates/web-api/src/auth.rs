//! Bearer 令牌提取
//!
//! `Authorization` 头必须严格为 `Bearer <token>`。缺失或格式错误返回 400，
//! 令牌校验失败返回 401。

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use domain::AccountId;

use crate::{error::ApiError, state::AppState};

/// 已通过令牌校验的调用者
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedAccount(pub AccountId);

impl FromRequestParts<AppState> for AuthenticatedAccount {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| ApiError::bad_request("missing authorization header"))?
            .to_str()
            .map_err(|_| ApiError::bad_request("authorization header is not valid ASCII"))?;

        let token = bearer_token(header)
            .ok_or_else(|| ApiError::bad_request("authorization header must be `Bearer <token>`"))?;

        let account_id = state.account_service.resolve_token(token)?;
        Ok(Self(account_id))
    }
}

fn bearer_token(header: &str) -> Option<&str> {
    let token = header.strip_prefix("Bearer ")?;
    if token.is_empty() || token.contains(char::is_whitespace) {
        return None;
    }
    Some(token)
}
