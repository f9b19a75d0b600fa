//! HTTP artifact registry.

use std::time::Duration;

use kiln_core::{
    application::ports::ArtifactRegistry,
    domain::{Artifact, BundleKey},
    error::{KilnError, KilnResult},
};
use reqwest::{StatusCode, blocking::Client};
use tracing::{debug, instrument};

use super::{fetch_error, not_found};

/// Response header carrying the bundle digest, `sha256:<hex>`.
pub const DIGEST_HEADER: &str = "x-artifact-digest";

/// Registry serving `GET <base>/<name>/<version>`.
///
/// 404 maps to not found; any other failure is a fetch error. Requests are
/// blocking and bounded by the client timeout.
#[derive(Debug, Clone)]
pub struct HttpRegistry {
    base_url: String,
    token: Option<String>,
    client: Client,
}

impl HttpRegistry {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> KilnResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("kiln/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| KilnError::Configuration {
                message: format!("cannot build HTTP client: {e}"),
            })?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            client,
        })
    }

    /// Send `Authorization: Bearer <token>` with every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, key: &BundleKey) -> String {
        format!("{}/{}/{}", self.base_url, key.name(), key.version())
    }
}

impl ArtifactRegistry for HttpRegistry {
    #[instrument(skip_all, fields(bundle = %key))]
    fn pull(&self, key: &BundleKey) -> KilnResult<Artifact> {
        let url = self.url_for(key);
        debug!(%url, "Requesting bundle");

        let mut request = self.client.get(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .map_err(|e| fetch_error(key, format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(not_found(key).into());
        }
        if !status.is_success() {
            return Err(fetch_error(key, format!("registry responded with {status}")).into());
        }

        let digest = response
            .headers()
            .get(DIGEST_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim().to_string());

        let bytes = response
            .bytes()
            .map_err(|e| fetch_error(key, format!("cannot read response body: {e}")))?;
        debug!(bytes = bytes.len(), has_digest = digest.is_some(), "Bundle downloaded");

        let artifact = Artifact::new(bytes.to_vec());
        Ok(match digest {
            Some(digest) => artifact.with_digest(digest),
            None => artifact,
        })
    }
}
