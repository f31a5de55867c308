//! Domain errors for the `GitLab` `AuthN` plugin.

use gitlab_authn_sdk::{AuthenticationError, MalformedUserDataError};
use http::StatusCode;

use crate::infra::gitlab_api::ApiError;

/// Internal domain errors.
#[derive(thiserror::Error, Debug)]
pub enum DomainError {
    #[error("username and password must not be empty")]
    EmptyCredentials,

    #[error("GitLab rejected the credentials with HTTP {0}")]
    Rejected(StatusCode),

    #[error("GitLab is unreachable: {0}")]
    Unreachable(String),

    #[error("malformed GitLab payload: {0}")]
    MalformedPayload(#[from] MalformedUserDataError),

    #[error("unexpected GitLab response: {0}")]
    UnexpectedResponse(String),
}

impl DomainError {
    #[must_use]
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::UnexpectedResponse(message.into())
    }
}

impl From<ApiError> for DomainError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::Status(status) => Self::Rejected(status),
            ApiError::Decode(_) => Self::UnexpectedResponse(e.to_string()),
            ApiError::Timeout(_)
            | ApiError::Transport(_)
            | ApiError::Request(_)
            | ApiError::Tls(_) => Self::Unreachable(e.to_string()),
        }
    }
}

impl From<DomainError> for AuthenticationError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::EmptyCredentials | DomainError::Rejected(_) => {
                Self::InvalidCredentials(e.to_string())
            }
            DomainError::Unreachable(msg) => Self::Connection(msg),
            DomainError::MalformedPayload(inner) => inner.into(),
            DomainError::UnexpectedResponse(msg) => Self::Protocol(msg),
        }
    }
}
