use std::time::Duration;

use application::Credentials;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use domain::{AccountId, Message, Room, RoomId};
use serde::{Deserialize, Serialize};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::{auth::AuthenticatedAccount, error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
struct CredentialsPayload {
    login: String,
    password: String,
}

impl From<CredentialsPayload> for Credentials {
    fn from(payload: CredentialsPayload) -> Self {
        Credentials::new(payload.login, payload.password)
    }
}

#[derive(Debug, Serialize)]
struct CreatedAccount {
    id: AccountId,
}

#[derive(Debug, Serialize)]
struct AccountView {
    id: AccountId,
    login: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
struct RoomView {
    id: RoomId,
    creator_id: AccountId,
    member_ids: Vec<AccountId>,
    members_count: usize,
}

impl From<Room> for RoomView {
    fn from(room: Room) -> Self {
        let member_ids: Vec<_> = room.members.into_iter().collect();
        Self {
            id: room.id,
            creator_id: room.creator,
            members_count: member_ids.len(),
            member_ids,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
struct RoomList {
    room_ids: Vec<RoomId>,
    rooms_number: usize,
}

#[derive(Debug, Deserialize)]
struct MemberChange {
    id: AccountId,
    #[serde(default)]
    delete: bool,
}

#[derive(Debug, Deserialize)]
struct UpdateRoomPayload {
    members: Vec<MemberChange>,
}

#[derive(Debug, Deserialize)]
struct CreateMessagePayload {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
struct MessageView {
    id: domain::MessageId,
    author_id: AccountId,
    text: String,
    #[serde(with = "time::serde::rfc3339")]
    created_at: domain::Timestamp,
}

impl From<Message> for MessageView {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            author_id: message.author,
            text: message.text,
            created_at: message.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct MessageList {
    messages: Vec<MessageView>,
}

/// 构建完整路由。每个请求都会被追踪，并受 `request_timeout` 限制（超时返回 408）。
pub fn router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/signup", post(signup))
        .route("/signin", post(signin))
        .route("/accounts/{account_id}", get(get_account))
        .route("/rooms", get(list_rooms).post(create_room))
        .route("/rooms/{room_id}", get(get_room).put(update_room))
        .route(
            "/rooms/{room_id}/messages",
            get(list_messages).post(create_message),
        )
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let account = state.account_service.create_account(payload.into()).await?;
    let location = format!("/accounts/{}", account.id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(CreatedAccount { id: account.id }),
    ))
}

async fn signin(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let token = state
        .account_service
        .authenticate_login(payload.into())
        .await?;

    Ok(([(header::CONTENT_TYPE, "application/jwt")], token))
}

async fn get_account(
    State(state): State<AppState>,
    AuthenticatedAccount(actor): AuthenticatedAccount,
    Path(account_id): Path<AccountId>,
) -> Result<Json<AccountView>, ApiError> {
    if actor != account_id {
        return Err(ApiError::unauthorized("cannot read another account"));
    }

    let account = state.account_service.get_account(&account_id).await?;
    Ok(Json(AccountView {
        id: account.id,
        login: account.login.as_str().to_owned(),
    }))
}

async fn list_rooms(
    State(state): State<AppState>,
    AuthenticatedAccount(actor): AuthenticatedAccount,
) -> Result<Json<RoomList>, ApiError> {
    let room_ids: Vec<_> = state
        .room_service
        .list_rooms(&actor)
        .await?
        .into_iter()
        .map(|room| room.id)
        .collect();

    Ok(Json(RoomList {
        rooms_number: room_ids.len(),
        room_ids,
    }))
}

async fn create_room(
    State(state): State<AppState>,
    AuthenticatedAccount(actor): AuthenticatedAccount,
) -> Result<impl IntoResponse, ApiError> {
    let room = state.room_service.create_room(&actor).await?;
    let location = format!("/rooms/{}", room.id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(RoomView::from(room)),
    ))
}

async fn get_room(
    State(state): State<AppState>,
    AuthenticatedAccount(actor): AuthenticatedAccount,
    Path(room_id): Path<RoomId>,
) -> Result<Json<RoomView>, ApiError> {
    let room = state.room_service.get_room(&actor, &room_id).await?;
    Ok(Json(RoomView::from(room)))
}

/// 先添加后删除，两步分别提交；第二步失败时第一步已生效。
async fn update_room(
    State(state): State<AppState>,
    AuthenticatedAccount(actor): AuthenticatedAccount,
    Path(room_id): Path<RoomId>,
    Json(payload): Json<UpdateRoomPayload>,
) -> Result<StatusCode, ApiError> {
    let (remove, add): (Vec<_>, Vec<_>) =
        payload.members.into_iter().partition(|change| change.delete);
    let add: Vec<_> = add.into_iter().map(|change| change.id).collect();
    let remove: Vec<_> = remove.into_iter().map(|change| change.id).collect();

    state
        .room_service
        .update_members(&actor, &room_id, &add, &remove)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_messages(
    State(state): State<AppState>,
    AuthenticatedAccount(actor): AuthenticatedAccount,
    Path(room_id): Path<RoomId>,
) -> Result<Json<MessageList>, ApiError> {
    // 消息服务本身不校验成员身份
    state.room_service.get_room(&actor, &room_id).await?;

    let messages = state
        .message_service
        .list_messages(&actor, &room_id)
        .await?
        .into_iter()
        .map(MessageView::from)
        .collect();
    Ok(Json(MessageList { messages }))
}

async fn create_message(
    State(state): State<AppState>,
    AuthenticatedAccount(actor): AuthenticatedAccount,
    Path(room_id): Path<RoomId>,
    Json(payload): Json<CreateMessagePayload>,
) -> Result<impl IntoResponse, ApiError> {
    state.room_service.get_room(&actor, &room_id).await?;

    let message = state
        .message_service
        .create_message(&actor, &room_id, &payload.text)
        .await?;
    Ok((StatusCode::CREATED, Json(MessageView::from(message))))
}
