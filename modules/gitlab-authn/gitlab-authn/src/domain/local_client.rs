//! Local (in-process) `Authenticator` backed by the service.

use std::sync::Arc;

use async_trait::async_trait;
use gitlab_authn_sdk::{
    AuthenticationError, AuthenticationOutcome, Authenticator, ConnectionCheck, GitLabGroupInfo,
    GitLabUserDetails,
};

use super::{DomainError, Service};

/// Local client wrapping the service.
///
/// Handed to the host by `GitLabAuthNPlugin::init`.
pub struct GitLabAuthNLocalClient {
    svc: Arc<Service>,
}

impl GitLabAuthNLocalClient {
    #[must_use]
    pub fn new(svc: Arc<Service>) -> Self {
        Self { svc }
    }
}

/// Log at a level matching the failure and convert to the public error.
///
/// Cognitive complexity is inflated by tracing macro expansion.
#[allow(clippy::cognitive_complexity)]
fn log_and_convert(op: &str, e: DomainError) -> AuthenticationError {
    match &e {
        DomainError::EmptyCredentials | DomainError::Rejected(_) => {
            tracing::debug!(operation = op, error = %e, "GitLab login rejected");
        }
        DomainError::Unreachable(_) => {
            tracing::warn!(operation = op, error = %e, "GitLab server unreachable");
        }
        DomainError::MalformedPayload(_) | DomainError::UnexpectedResponse(_) => {
            tracing::error!(operation = op, error = %e, "GitLab protocol error");
        }
    }
    e.into()
}

#[async_trait]
impl Authenticator for GitLabAuthNLocalClient {
    async fn authenticate(&self, username: &str, password: &str) -> AuthenticationOutcome {
        self.svc
            .authenticate(username, password)
            .await
            .map_err(|e| log_and_convert("authenticate", e))
    }

    async fn groups(
        &self,
        user: &GitLabUserDetails,
    ) -> Result<Vec<GitLabGroupInfo>, AuthenticationError> {
        self.svc
            .groups(user)
            .await
            .map_err(|e| log_and_convert("groups", e))
    }

    async fn check_connection(&self) -> ConnectionCheck {
        self.svc.check_connection().await
    }
}
