use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Opaque identifier of a published image. Only compared for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version(String);

impl Version {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // The service publishes epoch milliseconds, older deployments a string.
        match Value::deserialize(deserializer)? {
            Value::String(text) => Ok(Version(text)),
            Value::Number(number) => Ok(Version(number.to_string())),
            other => Err(serde::de::Error::custom(format!(
                "expected string or number timestamp, got {other}"
            ))),
        }
    }
}

/// The latest published image as reported by the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub version: Version,
    pub fetch_location: String,
}

impl CatalogEntry {
    /// Publication time, when the version is an epoch-milliseconds timestamp
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        let millis: i64 = self.version.as_str().parse().ok()?;
        DateTime::from_timestamp_millis(millis)
    }
}

/// JSON envelope returned by `GET /images/{user}`.
#[derive(Debug, Deserialize)]
pub struct LatestImageResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub timestamp: Option<Version>,
    #[serde(default, rename = "downloadUrl")]
    pub download_url: Option<String>,
}
