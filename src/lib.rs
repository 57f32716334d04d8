//! Polls the notes service for the latest published image and shows it on a
//! framebuffer-backed display.

pub mod catalog;
pub mod config;
pub mod fetcher;
pub mod logging;
pub mod render;
pub mod sync;
pub mod types;
