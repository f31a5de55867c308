//! Process-wide server configuration.
//!
//! The service reads a fresh snapshot on every call, so administrators can
//! replace the server URL or token at any time without restarting the plugin.

use std::sync::Arc;

use arc_swap::ArcSwap;
use secrecy::SecretString;

/// Server URL and server-level private token.
#[derive(Debug, Clone)]
pub struct ServerConfiguration {
    /// Base URL with trailing slashes removed.
    server_url: String,
    private_token: SecretString,
}

impl ServerConfiguration {
    #[must_use]
    pub fn new(server_url: impl Into<String>, private_token: impl Into<SecretString>) -> Self {
        Self {
            server_url: normalize_url(server_url.into()),
            private_token: private_token.into(),
        }
    }

    #[must_use]
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    #[must_use]
    pub fn private_token(&self) -> &SecretString {
        &self.private_token
    }
}

fn normalize_url(mut url: String) -> String {
    let trimmed = url.trim_end_matches('/').len();
    url.truncate(trimmed);
    url
}

/// Source of the current server configuration.
pub trait ConfigurationProvider: Send + Sync {
    /// Current snapshot. Never cached by callers across requests.
    fn get(&self) -> Arc<ServerConfiguration>;
}

/// Mutable configuration shared between the admin surface and the service.
pub struct SharedConfiguration {
    // Lock-free config using arc-swap for read-mostly access
    current: ArcSwap<ServerConfiguration>,
}

impl SharedConfiguration {
    #[must_use]
    pub fn new(initial: ServerConfiguration) -> Self {
        Self {
            current: ArcSwap::from_pointee(initial),
        }
    }

    /// Replace the whole configuration.
    pub fn store(&self, cfg: ServerConfiguration) {
        self.current.store(Arc::new(cfg));
    }

    pub fn set_server_url(&self, server_url: impl Into<String>) {
        let server_url = normalize_url(server_url.into());
        self.current.rcu(|cur| ServerConfiguration {
            server_url: server_url.clone(),
            private_token: cur.private_token.clone(),
        });
    }

    pub fn set_private_token(&self, private_token: impl Into<SecretString>) {
        let private_token: SecretString = private_token.into();
        self.current.rcu(|cur| ServerConfiguration {
            server_url: cur.server_url.clone(),
            private_token: private_token.clone(),
        });
    }
}

impl ConfigurationProvider for SharedConfiguration {
    fn get(&self) -> Arc<ServerConfiguration> {
        self.current.load_full()
    }
}
