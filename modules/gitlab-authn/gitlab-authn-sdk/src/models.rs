//! Domain models for the `GitLab` `AuthN` plugin.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::MalformedUserDataError;

/// Realm name reported by principals authenticated against `GitLab`.
pub const GITLAB_REALM: &str = "gitlab";

const AUTHENTICATED_AUTHORITIES: &[&str] = &["authenticated"];

/// Capability shared by every principal the host can hold in a session.
pub trait UserDetails: Send + Sync {
    /// Login name of the principal.
    fn username(&self) -> &str;

    /// Identifier of the realm that vouched for this principal.
    fn realm(&self) -> &'static str;

    /// Authorities granted to the principal by the realm itself.
    fn authorities(&self) -> &'static [&'static str];
}

/// A principal authenticated by a `GitLab` server.
///
/// Only obtainable through [`GitLabUserDetails::builder`], which refuses to
/// produce a value without an id and a non-empty username.
#[derive(Debug, Clone)]
pub struct GitLabUserDetails {
    /// `GitLab` user id, assigned by the server.
    id: i64,
    username: String,
    /// Empty when the server did not disclose an address.
    email: String,
    /// Per-user token returned by the session exchange.
    /// Wrapped in `SecretString` so `Debug` redacts the value automatically.
    private_token: SecretString,
}

impl GitLabUserDetails {
    #[must_use]
    pub fn builder() -> GitLabUserDetailsBuilder {
        GitLabUserDetailsBuilder::default()
    }

    #[must_use]
    pub fn id(&self) -> i64 {
        self.id
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn private_token(&self) -> &SecretString {
        &self.private_token
    }
}

impl PartialEq for GitLabUserDetails {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.username == other.username
            && self.email == other.email
            && self.private_token.expose_secret() == other.private_token.expose_secret()
    }
}

impl Eq for GitLabUserDetails {}

impl UserDetails for GitLabUserDetails {
    fn username(&self) -> &str {
        &self.username
    }

    fn realm(&self) -> &'static str {
        GITLAB_REALM
    }

    fn authorities(&self) -> &'static [&'static str] {
        AUTHENTICATED_AUTHORITIES
    }
}

#[derive(Default)]
pub struct GitLabUserDetailsBuilder {
    id: Option<i64>,
    username: Option<String>,
    email: Option<String>,
    private_token: Option<SecretString>,
}

impl GitLabUserDetailsBuilder {
    #[must_use]
    pub fn id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn private_token(mut self, token: impl Into<SecretString>) -> Self {
        self.private_token = Some(token.into());
        self
    }

    /// # Errors
    ///
    /// `MissingField` when `id` or `username` was never set, `EmptyField` when
    /// the username is empty.
    pub fn build(self) -> Result<GitLabUserDetails, MalformedUserDataError> {
        let id = self.id.ok_or(MalformedUserDataError::MissingField("id"))?;
        let username = self
            .username
            .ok_or(MalformedUserDataError::MissingField("username"))?;
        if username.is_empty() {
            return Err(MalformedUserDataError::EmptyField("username"));
        }

        Ok(GitLabUserDetails {
            id,
            username,
            email: self.email.unwrap_or_default(),
            private_token: self
                .private_token
                .unwrap_or_else(|| SecretString::from(String::new())),
        })
    }
}

/// A `GitLab` group visible to an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitLabGroupInfo {
    pub id: i64,
    pub name: String,
    /// URL path segment of the group.
    pub path: String,
}

/// Outcome of probing the configured server with the configured token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionCheck {
    pub ok: bool,
    /// Diagnostic for administrators, set when `ok` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ConnectionCheck {
    #[must_use]
    pub fn success() -> Self {
        Self {
            ok: true,
            message: None,
        }
    }

    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: Some(message.into()),
        }
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.ok
    }
}
