use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, error, info};

use crate::config::Config;
use crate::types::CatalogError;

use super::api_types::{CatalogEntry, LatestImageResponse};
use super::Catalog;

pub const CATALOG_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_USER_AGENT: &str = "love-notes-display";

const MAX_ERROR_BODY_CHARS: usize = 200;

/// Catalog backed by the notes service HTTP API.
#[derive(Clone)]
pub struct HttpCatalog {
    http: Client,
}

impl HttpCatalog {
    pub fn new() -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(CATALOG_TIMEOUT)
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Catalog for HttpCatalog {
    async fn latest(&self, config: &Config) -> Result<Option<CatalogEntry>, CatalogError> {
        let url = latest_image_url(config);
        debug!(url = %url, "Querying catalog");

        let response = self
            .http
            .get(&url)
            .basic_auth(&config.user, Some(&config.password))
            .header("Content-Type", "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        interpret_response(status, &body)
    }
}

pub fn latest_image_url(config: &Config) -> String {
    format!(
        "{}/images/{}",
        config.api_url.trim_end_matches('/'),
        config.user
    )
}

/// Map a catalog HTTP response onto entry / no entry / error.
pub fn interpret_response(
    status: StatusCode,
    body: &str,
) -> Result<Option<CatalogEntry>, CatalogError> {
    if status == StatusCode::NOT_FOUND {
        let message = serde_json::from_str::<LatestImageResponse>(body)
            .ok()
            .and_then(|envelope| envelope.message);
        info!(
            message = message.as_deref().unwrap_or("none"),
            "No images found for user"
        );
        return Ok(None);
    }

    if !status.is_success() {
        return Err(CatalogError::Status {
            status,
            body: truncate(body.trim(), MAX_ERROR_BODY_CHARS),
        });
    }

    let envelope: LatestImageResponse = serde_json::from_str(body)
        .map_err(|err| CatalogError::Malformed(err.to_string()))?;

    if !envelope.success {
        error!(
            message = envelope.message.as_deref().unwrap_or("Unknown error"),
            "Catalog returned an error"
        );
        return Ok(None);
    }

    let version = envelope
        .timestamp
        .ok_or_else(|| CatalogError::Malformed("missing `timestamp`".to_string()))?;
    let fetch_location = envelope
        .download_url
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| CatalogError::Malformed("missing `downloadUrl`".to_string()))?;

    Ok(Some(CatalogEntry {
        version,
        fetch_location,
    }))
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
