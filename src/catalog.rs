mod api_types;
mod client;

use async_trait::async_trait;

use crate::config::Config;
use crate::types::CatalogError;

pub use api_types::{CatalogEntry, LatestImageResponse, Version};
pub use client::{
    interpret_response, latest_image_url, HttpCatalog, CATALOG_TIMEOUT, DEFAULT_USER_AGENT,
};

/// Source of the most recently published image.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// `Ok(None)` means nothing is published yet; that is not a failure.
    async fn latest(&self, config: &Config) -> Result<Option<CatalogEntry>, CatalogError>;
}
