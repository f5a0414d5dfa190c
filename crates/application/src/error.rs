use domain::{DomainError, RepositoryError};
use thiserror::Error;

use crate::{password::PasswordHasherError, token::TokenError};

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),
    #[error("repository error: {0}")]
    Repository(RepositoryError),
    #[error("password error: {0}")]
    Password(#[from] PasswordHasherError),
    #[error("token error: {0}")]
    Token(#[from] TokenError),
    #[error("login not found")]
    InvalidLogin,
    #[error("invalid password")]
    InvalidPassword,
}

impl From<RepositoryError> for ApplicationError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Rejected(err) => ApplicationError::Domain(err),
            other => ApplicationError::Repository(other),
        }
    }
}
