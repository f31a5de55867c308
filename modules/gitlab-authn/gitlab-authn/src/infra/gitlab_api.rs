//! `GitLab` v3 HTTP API client.
//!
//! [`GitLabApi`] is the seam the service depends on; tests substitute a fake.
//! [`HyperGitLabClient`] is the production implementation.

use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::header::{ACCEPT, CONTENT_TYPE};
use http::{Method, Request, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use serde_json::Value;
use tracing::debug;

const API_PREFIX: &str = "/api/v3";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Transport-level failures of a `GitLab` API call.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("GitLab responded with HTTP {0}")]
    Status(StatusCode),

    #[error("request to GitLab timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("invalid request: {0}")]
    Request(String),

    #[error("TLS setup failed: {0}")]
    Tls(String),
}

/// Request/response contract of the `GitLab` endpoints used by the plugin.
///
/// Implementations must be safe for concurrent use; every call is an
/// independent exchange.
#[async_trait]
pub trait GitLabApi: Send + Sync {
    /// `GET /user?private_token=..`: the user owning `private_token`.
    async fn current_user(&self, server_url: &str, private_token: &str)
    -> Result<Value, ApiError>;

    /// `POST /session`: exchange a login and password for a session payload.
    async fn login(&self, server_url: &str, username: &str, password: &str)
    -> Result<Value, ApiError>;

    /// `GET /groups?private_token=..`: groups visible to the token owner.
    async fn groups(&self, server_url: &str, private_token: &str) -> Result<Value, ApiError>;
}

type HttpsClient = Client<HttpsConnector<HttpConnector>, Full<Bytes>>;

/// `GitLabApi` over a pooled `hyper` client with rustls.
///
/// Both `http` and `https` server URLs are accepted. Each exchange,
/// including reading the body, is bounded by the configured timeout.
#[derive(Clone)]
pub struct HyperGitLabClient {
    client: HttpsClient,
    timeout: Duration,
}

impl HyperGitLabClient {
    /// # Errors
    ///
    /// Returns `Tls` if the rustls client configuration cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, ApiError> {
        let native = rustls_native_certs::load_native_certs();
        for err in &native.errors {
            tracing::warn!(error = %err, "Failed to load native root certificates");
        }
        let mut roots = rustls::RootCertStore::empty();
        let (added, ignored) = roots.add_parsable_certificates(native.certs);
        debug!(added, ignored, "Loaded native root certificates");

        let provider = Arc::new(rustls::crypto::aws_lc_rs::default_provider());
        let tls = rustls::ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(|e| ApiError::Tls(e.to_string()))?
            .with_root_certificates(roots)
            .with_no_client_auth();
        let connector = HttpsConnectorBuilder::new()
            .with_tls_config(tls)
            .https_or_http()
            .enable_http1()
            .build();

        Ok(Self {
            client: Client::builder(TokioExecutor::new()).build(connector),
            timeout,
        })
    }

    async fn get_json(&self, url: String) -> Result<Value, ApiError> {
        let req = Request::builder()
            .method(Method::GET)
            .uri(url)
            .header(ACCEPT, JSON_CONTENT_TYPE)
            .body(Full::new(Bytes::new()))
            .map_err(|e| ApiError::Request(e.to_string()))?;
        self.send(req).await
    }

    async fn send(&self, req: Request<Full<Bytes>>) -> Result<Value, ApiError> {
        let method = req.method().clone();
        let path = req.uri().path().to_owned();

        let exchange = async {
            let resp = self
                .client
                .request(req)
                .await
                .map_err(|e| ApiError::Transport(error_chain(&e)))?;

            let status = resp.status();
            debug!(%method, %path, status = status.as_u16(), "GitLab responded");
            if !status.is_success() {
                return Err(ApiError::Status(status));
            }

            let body = resp
                .into_body()
                .collect()
                .await
                .map_err(|e| ApiError::Transport(error_chain(&e)))?
                .to_bytes();
            serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
        };

        tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| ApiError::Timeout(self.timeout))?
    }
}

#[async_trait]
impl GitLabApi for HyperGitLabClient {
    async fn current_user(
        &self,
        server_url: &str,
        private_token: &str,
    ) -> Result<Value, ApiError> {
        self.get_json(token_url(server_url, "user", private_token))
            .await
    }

    async fn login(
        &self,
        server_url: &str,
        username: &str,
        password: &str,
    ) -> Result<Value, ApiError> {
        let form = serde_urlencoded::to_string([("login", username), ("password", password)])
            .map_err(|e| ApiError::Request(e.to_string()))?;

        let req = Request::builder()
            .method(Method::POST)
            .uri(api_url(server_url, "session"))
            .header(ACCEPT, JSON_CONTENT_TYPE)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(Full::new(Bytes::from(form)))
            .map_err(|e| ApiError::Request(e.to_string()))?;
        self.send(req).await
    }

    async fn groups(&self, server_url: &str, private_token: &str) -> Result<Value, ApiError> {
        self.get_json(token_url(server_url, "groups", private_token))
            .await
    }
}

fn api_url(server_url: &str, resource: &str) -> String {
    format!("{}{API_PREFIX}/{resource}", server_url.trim_end_matches('/'))
}

fn token_url(server_url: &str, resource: &str, private_token: &str) -> String {
    format!(
        "{}?private_token={}",
        api_url(server_url, resource),
        urlencoding::encode(private_token)
    )
}

/// Render an error with its sources; `hyper_util` keeps the useful part
/// (connection refused, DNS failure) in the source chain.
fn error_chain(err: &dyn StdError) -> String {
    let mut parts = vec![err.to_string()];
    parts.extend(std::iter::successors(err.source(), |e| (*e).source()).map(ToString::to_string));
    parts.join(": ")
}
