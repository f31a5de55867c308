//! Authentication bridge between host logins and the `GitLab` API.

use std::sync::Arc;

use gitlab_authn_sdk::{ConnectionCheck, GitLabGroupInfo, GitLabUserDetails, UserDetails};
use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::error::DomainError;
use super::{group_info, user_details};
use crate::infra::config_store::ConfigurationProvider;
use crate::infra::gitlab_api::{ApiError, GitLabApi};

/// `GitLab` authentication service.
///
/// Holds no mutable state of its own: the server configuration is read from
/// the provider on every call and each call performs independent HTTP
/// exchanges, so one instance serves concurrent logins.
pub struct Service {
    api: Arc<dyn GitLabApi>,
    config: Arc<dyn ConfigurationProvider>,
}

impl Service {
    #[must_use]
    pub fn new(api: Arc<dyn GitLabApi>, config: Arc<dyn ConfigurationProvider>) -> Self {
        Self { api, config }
    }

    /// Exchange credentials for a principal.
    ///
    /// Credentials are forwarded verbatim, without trimming. The session
    /// payload is reused as is when it carries an email; otherwise the user
    /// is looked up once more with the freshly issued private token.
    ///
    /// # Errors
    ///
    /// - `EmptyCredentials` / `Rejected` when the login cannot succeed
    /// - `Unreachable` on connection failures and timeouts
    /// - `MalformedPayload` / `UnexpectedResponse` on unusable answers
    #[tracing::instrument(skip_all, fields(username = %username))]
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<GitLabUserDetails, DomainError> {
        if username.is_empty() || password.is_empty() {
            return Err(DomainError::EmptyCredentials);
        }

        let server = self.config.get();
        let session = self
            .api
            .login(server.server_url(), username, password)
            .await?;
        let user = user_details::from_json(&session)?;

        if user.private_token().expose_secret().is_empty() {
            return Err(DomainError::unexpected(
                "session payload carries no private token",
            ));
        }

        if !user.email().is_empty() {
            debug!(user_id = user.id(), "Authenticated from session payload");
            return Ok(user);
        }

        let current = self
            .api
            .current_user(server.server_url(), user.private_token().expose_secret())
            .await
            .map_err(|e| match e {
                ApiError::Status(status) => DomainError::unexpected(format!(
                    "user lookup with the session token failed with HTTP {status}"
                )),
                other => other.into(),
            })?;
        let profile = user_details::from_json(&current)?;
        if profile.id() != user.id() {
            return Err(DomainError::unexpected(format!(
                "session is for user {} but the token belongs to user {}",
                user.id(),
                profile.id()
            )));
        }

        debug!(user_id = user.id(), "Authenticated with user lookup");
        Ok(GitLabUserDetails::builder()
            .id(user.id())
            .username(user.username())
            .email(profile.email())
            .private_token(user.private_token().clone())
            .build()?)
    }

    /// Groups visible to `user`, queried with the user's own token.
    ///
    /// # Errors
    ///
    /// `Rejected` when the token is no longer accepted, plus the transport
    /// and payload errors of [`Service::authenticate`].
    #[tracing::instrument(skip_all, fields(username = %user.username()))]
    pub async fn groups(
        &self,
        user: &GitLabUserDetails,
    ) -> Result<Vec<GitLabGroupInfo>, DomainError> {
        let server = self.config.get();
        let payload = self
            .api
            .groups(server.server_url(), user.private_token().expose_secret())
            .await?;

        let Value::Array(items) = payload else {
            return Err(DomainError::unexpected("group listing is not a JSON array"));
        };
        let groups = items
            .iter()
            .map(group_info::from_json)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = groups.len(), "Listed GitLab groups");
        Ok(groups)
    }

    /// Probe the configured server with the configured private token.
    #[tracing::instrument(skip_all)]
    pub async fn check_connection(&self) -> ConnectionCheck {
        let server = self.config.get();
        if server.server_url().is_empty() {
            return ConnectionCheck::failure("GitLab server URL is not configured");
        }

        let result = self
            .api
            .current_user(server.server_url(), server.private_token().expose_secret())
            .await;

        match result {
            Ok(payload) => {
                // The status alone proves the token; the body is informational.
                info!(
                    server_url = %server.server_url(),
                    token_owner = payload.get("username").and_then(serde_json::Value::as_str),
                    "GitLab connection verified"
                );
                ConnectionCheck::success()
            }
            Err(e) => {
                let e = DomainError::from(e);
                warn!(server_url = %server.server_url(), error = %e, "GitLab connection check failed");
                ConnectionCheck::failure(e.to_string())
            }
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::sync::atomic::Ordering;

    use http::StatusCode;
    use serde_json::json;

    use super::*;
    use crate::infra::config_store::{ServerConfiguration, SharedConfiguration};
    use crate::test_support::{FakeGitLabApi, group_json, session_json, user_json};

    const SERVER_URL: &str = "http://localhost:9090";

    fn shared_config() -> Arc<SharedConfiguration> {
        Arc::new(SharedConfiguration::new(ServerConfiguration::new(
            SERVER_URL,
            "private_token".to_owned(),
        )))
    }

    fn service(api: &Arc<FakeGitLabApi>) -> Service {
        Service::new(api.clone(), shared_config())
    }

    #[tokio::test]
    async fn valid_credentials_produce_principal() {
        let api = Arc::new(FakeGitLabApi::new().with_account("username", "password", session_json()));

        let user = service(&api)
            .authenticate("username", "password")
            .await
            .unwrap();

        assert_eq!(user.username(), "username");
        assert_eq!(user.id(), 2);
        assert_eq!(user.email(), "user@example.com");
        assert_eq!(user.private_token().expose_secret(), "0123456789abcdef");
        assert_eq!(api.login_calls.load(Ordering::SeqCst), 1);
        assert_eq!(api.user_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn invalid_credentials_are_rejected() {
        let api = Arc::new(FakeGitLabApi::new().with_account("username", "password", session_json()));

        let err = service(&api)
            .authenticate("invalidusername", "invalidpassword")
            .await
            .unwrap_err();

        assert!(
            matches!(err, DomainError::Rejected(StatusCode::UNAUTHORIZED)),
            "got {err:?}"
        );
    }

    #[tokio::test]
    async fn empty_credentials_skip_the_network() {
        let api = Arc::new(FakeGitLabApi::new());
        let svc = service(&api);

        assert!(matches!(
            svc.authenticate("", "password").await,
            Err(DomainError::EmptyCredentials)
        ));
        assert!(matches!(
            svc.authenticate("username", "").await,
            Err(DomainError::EmptyCredentials)
        ));
        assert_eq!(api.login_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn credentials_are_not_trimmed() {
        let api = Arc::new(FakeGitLabApi::new().with_account("username", "password", session_json()));

        let err = service(&api)
            .authenticate(" username", "password ")
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Rejected(_)));
        assert_eq!(
            api.last_login(),
            Some((" username".to_owned(), "password ".to_owned()))
        );
    }

    #[tokio::test]
    async fn unreachable_server_is_a_connection_error() {
        let api = Arc::new(FakeGitLabApi::new().unreachable());

        let err = service(&api)
            .authenticate("username", "password")
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Unreachable(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn session_without_username_is_malformed() {
        let api = Arc::new(FakeGitLabApi::new().with_account(
            "username",
            "password",
            json!({ "id": 2, "private_token": "0123456789abcdef" }),
        ));

        let err = service(&api)
            .authenticate("username", "password")
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::MalformedPayload(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn session_without_token_is_unexpected() {
        let api = Arc::new(FakeGitLabApi::new().with_account(
            "username",
            "password",
            json!({ "id": 2, "username": "username", "email": "user@example.com" }),
        ));

        let err = service(&api)
            .authenticate("username", "password")
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::UnexpectedResponse(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn missing_email_is_filled_from_user_lookup() {
        let api = Arc::new(
            FakeGitLabApi::new()
                .with_account(
                    "username",
                    "password",
                    json!({ "id": 2, "username": "username", "private_token": "0123456789abcdef" }),
                )
                .with_token("0123456789abcdef", user_json()),
        );

        let user = service(&api)
            .authenticate("username", "password")
            .await
            .unwrap();

        assert_eq!(user.email(), "user@example.com");
        assert_eq!(user.private_token().expose_secret(), "0123456789abcdef");
        assert_eq!(api.user_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn user_lookup_for_another_user_is_unexpected() {
        let api = Arc::new(
            FakeGitLabApi::new()
                .with_account(
                    "username",
                    "password",
                    json!({ "id": 3, "username": "username", "private_token": "0123456789abcdef" }),
                )
                .with_token("0123456789abcdef", user_json()),
        );

        let err = service(&api)
            .authenticate("username", "password")
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::UnexpectedResponse(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn repeated_logins_agree_on_identity() {
        let api = Arc::new(FakeGitLabApi::new().with_account("username", "password", session_json()));
        let svc = service(&api);

        let first = svc.authenticate("username", "password").await.unwrap();
        let second = svc.authenticate("username", "password").await.unwrap();

        assert_eq!(first.id(), second.id());
        assert_eq!(first.username(), second.username());
    }

    #[tokio::test]
    async fn every_call_reads_fresh_configuration() {
        let api = Arc::new(FakeGitLabApi::new().with_account("username", "password", session_json()));
        let config = shared_config();
        let svc = Service::new(api.clone(), config.clone());

        svc.authenticate("username", "password").await.unwrap();
        config.set_server_url("https://gitlab.example.com/");
        svc.authenticate("username", "password").await.unwrap();

        assert_eq!(
            api.server_urls(),
            vec![SERVER_URL.to_owned(), "https://gitlab.example.com".to_owned()]
        );
    }

    #[tokio::test]
    async fn check_connection_accepts_known_token() {
        let api = Arc::new(FakeGitLabApi::new().with_token("private_token", user_json()));

        let check = service(&api).check_connection().await;

        assert!(check.is_ok());
        assert_eq!(check.message, None);
    }

    #[tokio::test]
    async fn check_connection_accepts_minimal_user_payload() {
        let api = Arc::new(
            FakeGitLabApi::new().with_token("private_token", json!({ "id": 1, "name": "Admin" })),
        );

        let check = service(&api).check_connection().await;

        assert!(check.is_ok(), "got {check:?}");
        assert_eq!(api.user_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn check_connection_reports_rejected_token() {
        let api = Arc::new(FakeGitLabApi::new());

        let check = service(&api).check_connection().await;

        assert!(!check.is_ok());
        assert!(check.message.unwrap().contains("401"));
    }

    #[tokio::test]
    async fn check_connection_reports_unreachable_server() {
        let api = Arc::new(FakeGitLabApi::new().unreachable());

        let check = service(&api).check_connection().await;

        assert!(!check.is_ok());
        assert!(check.message.is_some());
    }

    #[tokio::test]
    async fn check_connection_without_server_url_skips_the_network() {
        let api = Arc::new(FakeGitLabApi::new());
        let config = Arc::new(SharedConfiguration::new(ServerConfiguration::new(
            "",
            "private_token".to_owned(),
        )));

        let check = Service::new(api.clone(), config).check_connection().await;

        assert!(!check.is_ok());
        assert_eq!(api.user_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn groups_are_listed_with_user_token() {
        let api = Arc::new(
            FakeGitLabApi::new()
                .with_account("username", "password", session_json())
                .with_groups(
                    "0123456789abcdef",
                    json!([group_json(1, "Group 1", "group1"), group_json(2, "Group 2", "group2")]),
                ),
        );
        let svc = service(&api);
        let user = svc.authenticate("username", "password").await.unwrap();

        let groups = svc.groups(&user).await.unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].path, "group1");
        assert_eq!(groups[1].name, "Group 2");
    }

    #[tokio::test]
    async fn groups_with_revoked_token_are_rejected() {
        let api = Arc::new(FakeGitLabApi::new().with_account("username", "password", session_json()));
        let svc = service(&api);
        let user = svc.authenticate("username", "password").await.unwrap();

        let err = svc.groups(&user).await.unwrap_err();

        assert!(matches!(err, DomainError::Rejected(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn groups_payload_must_be_an_array() {
        let api = Arc::new(
            FakeGitLabApi::new()
                .with_account("username", "password", session_json())
                .with_groups("0123456789abcdef", group_json(1, "Group 1", "group1")),
        );
        let svc = service(&api);
        let user = svc.authenticate("username", "password").await.unwrap();

        let err = svc.groups(&user).await.unwrap_err();

        assert!(matches!(err, DomainError::UnexpectedResponse(_)), "got {err:?}");
    }
}
