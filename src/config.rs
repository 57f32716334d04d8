mod loader;
pub mod paths;
mod types;

pub use loader::ConfigSource;
pub use types::{Config, DisplaySettings, PixelFormat};
