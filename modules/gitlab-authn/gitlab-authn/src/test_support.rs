//! Fixtures and a scripted `GitLabApi` for unit tests.
#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use http::StatusCode;
use serde_json::{Value, json};

use crate::infra::gitlab_api::{ApiError, GitLabApi};

/// Body of `POST /api/v3/session` for the `username` account.
pub fn session_json() -> Value {
    json!({
        "id": 2,
        "username": "username",
        "email": "user@example.com",
        "name": "User Name",
        "private_token": "0123456789abcdef",
        "blocked": false,
        "created_at": "2014-08-01T12:00:00Z",
        "is_admin": false
    })
}

/// Body of `GET /api/v3/user` for the `username` account.
pub fn user_json() -> Value {
    session_json()
}

pub fn group_json(id: i64, name: &str, path: &str) -> Value {
    json!({ "id": id, "name": name, "path": path })
}

#[derive(Clone, Copy)]
enum Outage {
    Unreachable,
    Timeout,
}

/// In-memory stand-in for a `GitLab` server.
///
/// Unknown logins and tokens are answered with HTTP 401.
#[derive(Default)]
pub struct FakeGitLabApi {
    accounts: HashMap<(String, String), Value>,
    tokens: HashMap<String, Value>,
    groups: HashMap<String, Value>,
    outage: Option<Outage>,
    logins: Mutex<Vec<(String, String)>>,
    server_urls: Mutex<Vec<String>>,
    pub login_calls: AtomicUsize,
    pub user_calls: AtomicUsize,
}

impl FakeGitLabApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(mut self, login: &str, password: &str, session: Value) -> Self {
        self.accounts
            .insert((login.to_owned(), password.to_owned()), session);
        self
    }

    pub fn with_token(mut self, token: &str, user: Value) -> Self {
        self.tokens.insert(token.to_owned(), user);
        self
    }

    pub fn with_groups(mut self, token: &str, groups: Value) -> Self {
        self.groups.insert(token.to_owned(), groups);
        self
    }

    pub fn unreachable(mut self) -> Self {
        self.outage = Some(Outage::Unreachable);
        self
    }

    pub fn timing_out(mut self) -> Self {
        self.outage = Some(Outage::Timeout);
        self
    }

    pub fn last_login(&self) -> Option<(String, String)> {
        self.logins.lock().unwrap().last().cloned()
    }

    pub fn server_urls(&self) -> Vec<String> {
        self.server_urls.lock().unwrap().clone()
    }

    fn enter(&self, server_url: &str) -> Result<(), ApiError> {
        self.server_urls.lock().unwrap().push(server_url.to_owned());
        match self.outage {
            None => Ok(()),
            Some(Outage::Unreachable) => Err(ApiError::Transport(
                "client error (Connect): tcp connect error: Connection refused".to_owned(),
            )),
            Some(Outage::Timeout) => Err(ApiError::Timeout(Duration::from_millis(50))),
        }
    }
}

fn lookup(map: &HashMap<String, Value>, token: &str) -> Result<Value, ApiError> {
    map.get(token)
        .cloned()
        .ok_or(ApiError::Status(StatusCode::UNAUTHORIZED))
}

#[async_trait]
impl GitLabApi for FakeGitLabApi {
    async fn current_user(
        &self,
        server_url: &str,
        private_token: &str,
    ) -> Result<Value, ApiError> {
        self.user_calls.fetch_add(1, Ordering::SeqCst);
        self.enter(server_url)?;
        lookup(&self.tokens, private_token)
    }

    async fn login(
        &self,
        server_url: &str,
        username: &str,
        password: &str,
    ) -> Result<Value, ApiError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        self.logins
            .lock()
            .unwrap()
            .push((username.to_owned(), password.to_owned()));
        self.enter(server_url)?;
        self.accounts
            .get(&(username.to_owned(), password.to_owned()))
            .cloned()
            .ok_or(ApiError::Status(StatusCode::UNAUTHORIZED))
    }

    async fn groups(&self, server_url: &str, private_token: &str) -> Result<Value, ApiError> {
        self.enter(server_url)?;
        lookup(&self.groups, private_token)
    }
}
