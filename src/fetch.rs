//! Fetch-by-URL for the template, source documents and logos

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

/// Why a fetch produced no bytes
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Connection, DNS, TLS or body read failure
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    /// Server answered with a non-2xx status
    #[error("request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },
}

pub type FetchResult = std::result::Result<Vec<u8>, FetchError>;

/// Source of remote bytes
///
/// One attempt per call: no retries, no timeout beyond what the implementation's
/// transport imposes.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> FetchResult;
}

/// reqwest-backed fetcher
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self { client: Client::new() }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchResult {
        debug!("GET {}", url);

        let transport = |e: reqwest::Error| FetchError::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        };

        let response = self.client.get(url).send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(transport)?;
        Ok(bytes.to_vec())
    }
}

/// Resolve a document location against the document base URL
///
/// Absolute `http(s)://` URLs pass through untouched. Anything else is treated as a
/// path below `base_url`: every segment is percent-encoded on its own and the `/`
/// separators are kept literally.
pub fn resolve_document_url(base_url: &str, location: &str) -> String {
    let location = location.trim();
    if is_absolute_url(location) {
        return location.to_string();
    }

    let encoded: Vec<String> = location
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect();

    format!("{}/{}", base_url.trim_end_matches('/'), encoded.join("/"))
}

fn is_absolute_url(location: &str) -> bool {
    let lower = location.get(..8).unwrap_or(location).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
