#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! `GitLab` `AuthN` Plugin
//!
//! Authenticates users of the host against a `GitLab` server and maps the
//! returned account into a [`GitLabUserDetails`](gitlab_authn_sdk::GitLabUserDetails)
//! principal.
//!
//! ## Flow
//!
//! 1. `POST /api/v3/session` exchanges the login and password for a session
//!    payload carrying the user id, username and a per-user private token.
//! 2. When the session payload lacks an email, `GET /api/v3/user` is issued
//!    with the fresh private token to complete the principal.
//! 3. Every failure is folded into `AuthenticationError`; no transport error
//!    reaches the host.
//!
//! ## Configuration
//!
//! ```yaml
//! server_url: "https://gitlab.example.com"
//! private_token: "admin-private-token"
//! timeout_ms: 10000
//! verify_on_init: true
//! ```

pub mod config;
pub mod domain;
pub mod infra;
pub mod module;

#[cfg(test)]
mod test_support;

pub use config::GitLabAuthNConfig;
pub use infra::config_store::{ConfigurationProvider, ServerConfiguration, SharedConfiguration};
pub use infra::gitlab_api::{ApiError, GitLabApi, HyperGitLabClient};
pub use module::GitLabAuthNPlugin;
