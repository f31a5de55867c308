//! Public API trait for `GitLab` authentication.
//!
//! The host session manager depends on this trait only. It never sees the
//! HTTP client, the configuration store or any transport error.

use async_trait::async_trait;

use crate::error::AuthenticationError;
use crate::models::{ConnectionCheck, GitLabGroupInfo, GitLabUserDetails};

/// Result of a single authentication attempt.
pub type AuthenticationOutcome = Result<GitLabUserDetails, AuthenticationError>;

/// Credential-to-principal capability.
///
/// Implementations hold no per-user mutable state and are safe to share
/// between concurrent login attempts.
///
/// ```ignore
/// let authn: Arc<dyn Authenticator> = plugin.init(cfg)?;
/// let user = authn.authenticate("username", "password").await?;
/// assert_eq!(user.username(), "username");
/// ```
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Exchange a username and password for a `GitLab`-backed principal.
    ///
    /// # Errors
    ///
    /// - `InvalidCredentials` if the server rejects the login
    /// - `Connection` if the server is unreachable or does not answer in time
    /// - `Protocol` if the server answers with an unexpected payload
    async fn authenticate(&self, username: &str, password: &str) -> AuthenticationOutcome;

    /// Lookup that never fails: any error, including an unreachable server,
    /// yields `None`. Callers that need to tell a rejected login apart from an
    /// outage must use [`Authenticator::authenticate`].
    async fn try_authenticate(&self, username: &str, password: &str) -> Option<GitLabUserDetails> {
        self.authenticate(username, password).await.ok()
    }

    /// List the groups visible to an authenticated principal, using its
    /// private token.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`Authenticator::authenticate`]; a revoked token
    /// surfaces as `InvalidCredentials`.
    async fn groups(
        &self,
        user: &GitLabUserDetails,
    ) -> Result<Vec<GitLabGroupInfo>, AuthenticationError>;

    /// Probe the configured server with the configured private token.
    ///
    /// Never fails: problems are reported through [`ConnectionCheck::message`].
    async fn check_connection(&self) -> ConnectionCheck;

    /// Shorthand for `check_connection().await.is_ok()`.
    async fn verify_connection(&self) -> bool {
        self.check_connection().await.is_ok()
    }
}
