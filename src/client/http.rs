//! HTTP transport for the Docker Engine API

use super::{FilterSet, SwarmApi};
use crate::error::{Result, SwarmctlError};
use crate::swarm::{Config, Node, Service, Task};
use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

/// Engine API version the client speaks
pub const API_VERSION: &str = "1.43";

/// Manager address used when nothing else is configured
pub const DEFAULT_HOST: &str = "http://localhost:2375";

/// Error body returned by the engine on non-2xx responses
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: String,
}

/// Swarm API client over plain HTTP
pub struct HttpClient {
    /// Base URL, e.g. `http://manager:2375/`
    base_url: Url,
    /// HTTP client
    client: reqwest::Client,
}

impl HttpClient {
    /// Create a client for `host` (`http://`, `https://` or `tcp://`)
    pub fn new(host: &str) -> Result<Self> {
        let normalized = normalize_host(host)?;
        let base_url = Url::parse(&normalized)
            .map_err(|e| SwarmctlError::InvalidConfig(format!("invalid host {}: {}", host, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(SwarmctlError::InvalidConfig(format!("invalid host {}", host)));
        }
        let client = reqwest::Client::builder()
            .user_agent(concat!("swarmctl/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { base_url, client })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Versioned endpoint URL; each segment is percent-encoded on its own
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Checked in `new`
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .push(&format!("v{}", API_VERSION))
                .extend(segments);
        }
        url
    }

    /// Issue a GET and return the raw response body
    async fn get_raw(&self, segments: &[&str], filters: Option<&FilterSet>) -> Result<Vec<u8>> {
        let url = self.url(segments);
        let mut request = self.client.get(url.clone());
        if let Some(filters) = filters.filter(|f| !f.is_empty()) {
            request = request.query(&[("filters", filters.to_json())]);
        }

        debug!("GET {}", url);
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        debug!("GET {} -> {} ({} bytes)", url, status, body.len());

        if !status.is_success() {
            return Err(SwarmctlError::Daemon(error_message(status, &body)));
        }

        Ok(body.to_vec())
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        filters: Option<&FilterSet>,
    ) -> Result<T> {
        let body = self.get_raw(segments, filters).await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl SwarmApi for HttpClient {
    async fn list_services(&self, filters: &FilterSet) -> Result<Vec<Service>> {
        self.get_json(&["services"], Some(filters)).await
    }

    async fn list_nodes(&self, filters: &FilterSet) -> Result<Vec<Node>> {
        self.get_json(&["nodes"], Some(filters)).await
    }

    async fn list_tasks(&self, filters: &FilterSet) -> Result<Vec<Task>> {
        self.get_json(&["tasks"], Some(filters)).await
    }

    async fn list_configs(&self, filters: &FilterSet) -> Result<Vec<Config>> {
        self.get_json(&["configs"], Some(filters)).await
    }

    async fn inspect_config(&self, id: &str) -> Result<(Config, Vec<u8>)> {
        // Empty and dot segments would address the collection instead
        if id.trim().is_empty() || id == "." || id == ".." {
            return Err(SwarmctlError::Api(format!("config {:?} not found", id)));
        }
        let body = self.get_raw(&["configs", id], None).await?;
        let config = serde_json::from_slice(&body)?;
        Ok((config, body))
    }
}

/// Turn a configured host into a base URL
fn normalize_host(host: &str) -> Result<String> {
    let host = host.trim().trim_end_matches('/');
    if host.is_empty() {
        return Err(SwarmctlError::InvalidConfig("empty host".to_string()));
    }

    let url = if let Some(rest) = host.strip_prefix("tcp://") {
        format!("http://{}", rest)
    } else if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else if host.starts_with("unix://") || host.starts_with("npipe://") {
        return Err(SwarmctlError::InvalidConfig(format!(
            "unsupported host {}: use tcp://, http:// or https://",
            host
        )));
    } else if host.contains("://") {
        return Err(SwarmctlError::InvalidConfig(format!(
            "invalid host {}",
            host
        )));
    } else {
        format!("http://{}", host)
    };

    Ok(url)
}

fn error_message(status: reqwest::StatusCode, body: &[u8]) -> String {
    match serde_json::from_slice::<ErrorResponse>(body) {
        Ok(err) => err.message,
        Err(_) => {
            let text = String::from_utf8_lossy(body).trim().to_string();
            if text.is_empty() {
                status.to_string()
            } else {
                text
            }
        }
    }
}
