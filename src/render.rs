mod display;
mod framebuffer;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::types::RenderError;

pub use display::Display;
pub use framebuffer::{encode_frame, FramebufferDisplay};

/// Sole owner of the output device. Renders are serialized by the device lock.
pub struct Renderer {
    device: Mutex<Box<dyn Display>>,
    dimensions: (u32, u32),
}

impl Renderer {
    pub fn new(device: Box<dyn Display>) -> Self {
        let dimensions = device.dimensions();
        Self {
            device: Mutex::new(device),
            dimensions,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }

    /// Decode `content` and push it to the device as one atomic update.
    /// Decoding runs on the blocking pool.
    pub async fn render(&self, content: Vec<u8>) -> Result<(), RenderError> {
        let image =
            tokio::task::spawn_blocking(move || image::load_from_memory(&content)).await??;
        let decoded = (image.width(), image.height());
        debug!(width = decoded.0, height = decoded.1, "Decoded image");

        if decoded != self.dimensions {
            warn!(
                image_width = decoded.0,
                image_height = decoded.1,
                display_width = self.dimensions.0,
                display_height = self.dimensions.1,
                "Image does not match display resolution"
            );
        }

        let mut device = self.device.lock().await;
        device.show(&image).await?;
        info!("Successfully updated display with new image");
        Ok(())
    }
}
