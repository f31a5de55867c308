//! `GitLab` `AuthN` plugin wiring.

use std::sync::{Arc, OnceLock};

use gitlab_authn_sdk::Authenticator;
use tracing::{info, warn};

use crate::config::GitLabAuthNConfig;
use crate::domain::{GitLabAuthNLocalClient, Service};
use crate::infra::config_store::SharedConfiguration;
use crate::infra::gitlab_api::{GitLabApi, HyperGitLabClient};

/// `GitLab` `AuthN` plugin.
///
/// Builds the service from configuration and hands the host an
/// [`Authenticator`]. The shared configuration stays reachable through
/// [`GitLabAuthNPlugin::configuration`] so an admin surface can update the
/// server URL or token at runtime.
#[derive(Default)]
pub struct GitLabAuthNPlugin {
    service: OnceLock<Arc<Service>>,
    configuration: OnceLock<Arc<SharedConfiguration>>,
}

impl GitLabAuthNPlugin {
    /// Initialize with the production `hyper` client.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the HTTP client
    /// cannot be built, or the plugin was already initialized.
    pub async fn init(&self, cfg: &GitLabAuthNConfig) -> anyhow::Result<Arc<dyn Authenticator>> {
        cfg.validate()?;
        let api = Arc::new(HyperGitLabClient::new(cfg.timeout())?);
        self.init_with_api(cfg, api).await
    }

    /// Initialize with a caller-provided `GitLabApi`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the plugin was
    /// already initialized.
    #[tracing::instrument(skip_all, fields(server_url = %cfg.server_url))]
    pub async fn init_with_api(
        &self,
        cfg: &GitLabAuthNConfig,
        api: Arc<dyn GitLabApi>,
    ) -> anyhow::Result<Arc<dyn Authenticator>> {
        info!("Initializing gitlab_authn");
        cfg.validate()?;

        let configuration = Arc::new(SharedConfiguration::new(cfg.server_configuration()));
        let service = Arc::new(Service::new(api, configuration.clone()));

        self.service
            .set(service.clone())
            .map_err(|_| anyhow::anyhow!("Service already initialized"))?;
        self.configuration
            .set(configuration)
            .map_err(|_| anyhow::anyhow!("Configuration already initialized"))?;

        info!(
            timeout_ms = cfg.timeout_ms,
            verify_on_init = cfg.verify_on_init,
            "Loaded plugin configuration"
        );

        if cfg.verify_on_init {
            let check = service.check_connection().await;
            if !check.is_ok() {
                warn!(
                    reason = check.message.as_deref().unwrap_or("unknown"),
                    "GitLab server did not accept the configured token; logins may fail"
                );
            }
        }

        let api: Arc<dyn Authenticator> = Arc::new(GitLabAuthNLocalClient::new(service));
        info!("GitLab authn plugin initialized");
        Ok(api)
    }

    /// Runtime configuration handle, available after `init`.
    #[must_use]
    pub fn configuration(&self) -> Option<Arc<SharedConfiguration>> {
        self.configuration.get().cloned()
    }
}
