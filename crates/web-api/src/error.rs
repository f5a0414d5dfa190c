use application::{ApplicationError, TokenError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::{DomainError, RepositoryError};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                code,
                message: message.into(),
            },
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    fn room_not_found() -> Self {
        // 房间不存在与非成员访问对外不可区分
        Self::new(StatusCode::NOT_FOUND, "ROOM_NOT_FOUND", "room not found")
    }
}

impl From<ApplicationError> for ApiError {
    fn from(error: ApplicationError) -> Self {
        use application::ApplicationError as AppErr;

        match error {
            AppErr::Domain(DomainError::InvalidFormat { field, reason }) => ApiError::new(
                StatusCode::BAD_REQUEST,
                "INVALID_FORMAT",
                format!("invalid {field}: {reason}"),
            ),
            AppErr::Domain(DomainError::DuplicateLogin) => {
                ApiError::new(StatusCode::CONFLICT, "DUPLICATE_LOGIN", "login already taken")
            }
            AppErr::Domain(DomainError::AccountNotFound) => {
                ApiError::new(StatusCode::NOT_FOUND, "ACCOUNT_NOT_FOUND", "account not found")
            }
            AppErr::Domain(DomainError::RoomNotFound | DomainError::NotRoomMember) => {
                ApiError::room_not_found()
            }
            AppErr::InvalidLogin => {
                ApiError::new(StatusCode::BAD_REQUEST, "INVALID_LOGIN", "login not found")
            }
            AppErr::InvalidPassword => {
                ApiError::new(StatusCode::BAD_REQUEST, "INVALID_PASSWORD", "invalid password")
            }
            AppErr::Token(TokenError::InvalidToken) => {
                ApiError::new(StatusCode::UNAUTHORIZED, "INVALID_TOKEN", "invalid token")
            }
            AppErr::Token(TokenError::Expired) => {
                ApiError::new(StatusCode::UNAUTHORIZED, "TOKEN_EXPIRED", "token expired")
            }
            AppErr::Token(err @ TokenError::Signing(_)) => {
                tracing::error!(error = %err, "token signing failed");
                ApiError::internal_server_error("token signing failed")
            }
            AppErr::Repository(repo_err) => match repo_err {
                RepositoryError::NotFound => ApiError::new(
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    "requested resource not found",
                ),
                RepositoryError::Unauthorized => ApiError::room_not_found(),
                RepositoryError::Conflict => {
                    ApiError::new(StatusCode::CONFLICT, "CONFLICT", "resource already exists")
                }
                RepositoryError::Rejected(err) => ApiError::from(AppErr::Domain(err)),
                RepositoryError::Storage { message } => {
                    tracing::error!(error = %message, "storage failure");
                    ApiError::new(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "STORAGE_ERROR",
                        "storage error",
                    )
                }
            },
            AppErr::Password(err) => {
                tracing::error!(error = %err, "password hashing failed");
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PASSWORD_ERROR",
                    "password processing failed",
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
