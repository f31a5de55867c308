//! Configuration for the `GitLab` `AuthN` plugin.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, bail};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer};

use crate::infra::config_store::ServerConfiguration;

/// Environment variable prefix, e.g. `GITLAB_AUTHN_SERVER_URL`.
pub const ENV_PREFIX: &str = "GITLAB_AUTHN_";

/// Keys taken verbatim from the environment. Figment would otherwise parse
/// `GITLAB_AUTHN_PRIVATE_TOKEN=0123` as the integer 123.
const RAW_ENV_KEYS: &[&str] = &["server_url", "private_token"];

/// Plugin configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitLabAuthNConfig {
    /// Base URL of the `GitLab` server, without the `/api/v3` suffix.
    #[serde(deserialize_with = "string_or_number")]
    pub server_url: String,

    /// Server-level private token used for connectivity checks.
    #[serde(deserialize_with = "secret_string_or_number")]
    pub private_token: SecretString,

    /// Upper bound for a single HTTP exchange with the server.
    pub timeout_ms: u64,

    /// Probe the server during `init` and log a warning when it fails.
    pub verify_on_init: bool,
}

impl Default for GitLabAuthNConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost".to_owned(),
            private_token: SecretString::from(String::new()),
            timeout_ms: default_timeout_ms(),
            verify_on_init: false,
        }
    }
}

fn default_timeout_ms() -> u64 {
    10_000
}

/// Accept unquoted numeric scalars (`private_token: 12345` in YAML) for
/// string settings.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Unsigned(u64),
        Signed(i64),
    }

    Ok(match Scalar::deserialize(deserializer)? {
        Scalar::Text(text) => text,
        Scalar::Unsigned(n) => n.to_string(),
        Scalar::Signed(n) => n.to_string(),
    })
}

fn secret_string_or_number<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    string_or_number(deserializer).map(SecretString::from)
}

impl GitLabAuthNConfig {
    /// Load configuration from an optional YAML file, overridden by
    /// `GITLAB_AUTHN_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be parsed or the result fails
    /// [`GitLabAuthNConfig::validate`].
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            figment = figment.merge(Yaml::file_exact(path));
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).ignore(RAW_ENV_KEYS));
        for (key, value) in Env::prefixed(ENV_PREFIX).only(RAW_ENV_KEYS).iter() {
            figment = figment.merge(Serialized::default(
                &key.as_str().to_ascii_lowercase(),
                value,
            ));
        }

        let cfg: Self = figment
            .extract()
            .context("failed to load gitlab_authn configuration")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// # Errors
    ///
    /// Returns an error when the timeout is zero or the server URL is not an
    /// `http`/`https` URL.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.timeout_ms == 0 {
            bail!("timeout_ms must be greater than zero");
        }
        if !(self.server_url.starts_with("http://") || self.server_url.starts_with("https://")) {
            bail!(
                "server_url must start with http:// or https://, got '{}'",
                self.server_url
            );
        }
        Ok(())
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    #[must_use]
    pub fn server_configuration(&self) -> ServerConfiguration {
        ServerConfiguration::new(self.server_url.clone(), self.private_token.clone())
    }
}
