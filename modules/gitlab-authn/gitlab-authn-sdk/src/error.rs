//! Error types for `GitLab` authentication.

use serde::Serialize;
use thiserror::Error;

/// Coarse classification of an authentication failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Bad login or password.
    InvalidCredentials,
    /// Server unreachable or timed out. Retryable by the user.
    ConnectionError,
    /// Unexpected response shape, usually a server/version mismatch.
    ProtocolError,
}

/// Errors returned by an [`Authenticator`](crate::Authenticator).
///
/// The attached message is diagnostic and meant for logs. Use
/// [`AuthenticationError::user_message`] for anything shown to end users.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthenticationError {
    /// The server rejected the supplied credentials.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The server could not be reached within the configured timeout.
    #[error("connection error: {0}")]
    Connection(String),

    /// The server answered with a payload the plugin cannot interpret.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl AuthenticationError {
    #[must_use]
    pub fn invalid_credentials(message: impl Into<String>) -> Self {
        Self::InvalidCredentials(message.into())
    }

    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    #[must_use]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }

    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::InvalidCredentials(_) => FailureKind::InvalidCredentials,
            Self::Connection(_) => FailureKind::ConnectionError,
            Self::Protocol(_) => FailureKind::ProtocolError,
        }
    }

    /// Diagnostic message without the kind prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::InvalidCredentials(msg) | Self::Connection(msg) | Self::Protocol(msg) => msg,
        }
    }

    /// Generic text that is safe to show to the person logging in.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidCredentials(_) => "Invalid username or password",
            Self::Connection(_) => "The GitLab server could not be reached, please try again later",
            Self::Protocol(_) => "The GitLab server returned an unexpected response",
        }
    }
}

/// A `GitLab` payload could not be turned into a model object.
///
/// Surfaces as [`AuthenticationError::Protocol`] at the authenticator boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedUserDataError {
    #[error("expected a JSON object")]
    NotAnObject,

    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("field '{field}' has the wrong type, expected {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("field '{0}' must not be empty")]
    EmptyField(&'static str),
}

impl From<MalformedUserDataError> for AuthenticationError {
    fn from(e: MalformedUserDataError) -> Self {
        Self::Protocol(e.to_string())
    }
}
