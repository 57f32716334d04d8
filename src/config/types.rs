use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Credentials and endpoint settings for the display agent.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub user: String,

    pub password: String,

    pub api_url: String,

    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    #[serde(default)]
    pub display: DisplaySettings,
}

impl Config {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field("display", &self.display)
            .finish()
    }
}

/// Framebuffer device settings. Only read once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySettings {
    #[serde(default = "default_framebuffer")]
    pub framebuffer: PathBuf,

    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,

    #[serde(default)]
    pub pixel_format: PixelFormat,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            framebuffer: default_framebuffer(),
            width: default_width(),
            height: default_height(),
            pixel_format: PixelFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    #[default]
    Bgra8888,
    Rgb565,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Bgra8888 => 4,
            PixelFormat::Rgb565 => 2,
        }
    }
}

fn default_poll_interval_secs() -> u64 {
    15
}

fn default_framebuffer() -> PathBuf {
    PathBuf::from("/dev/fb0")
}

fn default_width() -> u32 {
    640
}

fn default_height() -> u32 {
    400
}
