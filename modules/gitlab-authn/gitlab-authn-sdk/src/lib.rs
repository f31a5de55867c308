//! `GitLab` `AuthN` SDK
//!
//! This crate provides the public contract of the `gitlab_authn` plugin:
//!
//! - [`Authenticator`] - Capability trait consumed by the host session manager
//! - [`GitLabUserDetails`] - Principal built from a `GitLab` user payload
//! - [`UserDetails`] - Capability marker shared by all principals
//! - [`GitLabGroupInfo`] - Group visible to an authenticated user
//! - [`AuthenticationError`] / [`FailureKind`] - Failure taxonomy
//! - [`ConnectionCheck`] - Result of a configuration-time connectivity probe
//!
//! ## Usage
//!
//! ```ignore
//! use gitlab_authn_sdk::{Authenticator, FailureKind};
//!
//! match authenticator.authenticate("jdoe", "s3cret").await {
//!     Ok(user) => session.bind(user),
//!     Err(e) if e.kind() == FailureKind::InvalidCredentials => reject_login(),
//!     Err(e) => show_error(e.user_message()),
//! }
//! ```

pub mod api;
pub mod error;
pub mod models;

// Re-export main types at crate root
pub use api::{AuthenticationOutcome, Authenticator};
pub use error::{AuthenticationError, FailureKind, MalformedUserDataError};
pub use models::{
    ConnectionCheck, GITLAB_REALM, GitLabGroupInfo, GitLabUserDetails, GitLabUserDetailsBuilder,
    UserDetails,
};
