use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Failure to produce a complete, valid [`Config`](crate::config::Config).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Failure to query the remote catalog. "No entry" is not an error.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog request timed out")]
    Timeout,

    #[error("failed to reach catalog: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("catalog returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("malformed catalog response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CatalogError::Timeout
        } else {
            CatalogError::Transport(err)
        }
    }
}

/// Failure to download artifact content.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("download timed out")]
    Timeout,

    #[error("download failed with status {0}")]
    Status(StatusCode),

    #[error("download failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("download returned an empty body")]
    Empty,

    #[error("download exceeded {limit} bytes")]
    TooLarge { limit: u64 },
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if let Some(status) = err.status() {
            FetchError::Status(status)
        } else {
            FetchError::Transport(err)
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("decode task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("display I/O failed: {0}")]
    Device(#[from] std::io::Error),
}

/// Startup failures. These end the process with a non-zero status.
#[derive(Debug, Error)]
pub enum InitError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to open display {}: {source}", path.display())]
    Display {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}
