//! Artifact download over plain HTTP GET.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::catalog::DEFAULT_USER_AGENT;
use crate::types::FetchError;

pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Hard cap on a downloaded image body.
pub const MAX_DOWNLOAD_BYTES: u64 = 32 * 1024 * 1024;

/// Downloads the raw bytes behind a fetch location.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>, FetchError>;
}

#[derive(Clone)]
pub struct HttpFetcher {
    http: Client,
    max_bytes: u64,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;
        Ok(Self {
            http,
            max_bytes: MAX_DOWNLOAD_BYTES,
        })
    }

    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>, FetchError> {
        // Pre-signed URL, no credentials attached.
        let mut response = self.http.get(location).send().await?.error_for_status()?;
        let total_bytes = response.content_length();
        let limit = self.max_bytes;
        if total_bytes.is_some_and(|total| total > limit) {
            return Err(FetchError::TooLarge { limit });
        }

        // Content-Length is already bounded by `limit` here.
        let mut content = Vec::with_capacity(total_bytes.unwrap_or(0) as usize);
        while let Some(chunk) = response.chunk().await? {
            if (content.len() + chunk.len()) as u64 > limit {
                return Err(FetchError::TooLarge { limit });
            }
            content.extend_from_slice(&chunk);
        }

        debug!(
            downloaded_bytes = content.len(),
            total_bytes = ?total_bytes,
            "Downloaded image"
        );

        if content.is_empty() {
            return Err(FetchError::Empty);
        }
        Ok(content)
    }
}
