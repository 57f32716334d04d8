use std::path::PathBuf;

use async_trait::async_trait;
use image::DynamicImage;
use tokio::fs::OpenOptions;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use tracing::debug;

use crate::config::{DisplaySettings, PixelFormat};
use crate::types::{InitError, RenderError};

use super::Display;

const BACKGROUND: [u8; 3] = [0xff, 0xff, 0xff];

/// Linux framebuffer device (`/dev/fbN`).
pub struct FramebufferDisplay {
    path: PathBuf,
    width: u32,
    height: u32,
    pixel_format: PixelFormat,
}

impl FramebufferDisplay {
    /// Checks the device node is writable before the loop starts.
    pub async fn open(settings: &DisplaySettings) -> Result<Self, InitError> {
        OpenOptions::new()
            .write(true)
            .open(&settings.framebuffer)
            .await
            .map_err(|err| InitError::Display {
                path: settings.framebuffer.clone(),
                source: err,
            })?;

        Ok(Self {
            path: settings.framebuffer.clone(),
            width: settings.width,
            height: settings.height,
            pixel_format: settings.pixel_format,
        })
    }
}

#[async_trait]
impl Display for FramebufferDisplay {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    async fn show(&mut self, image: &DynamicImage) -> Result<(), RenderError> {
        let frame = encode_frame(image, self.width, self.height, self.pixel_format);

        let mut device = OpenOptions::new().write(true).open(&self.path).await?;
        device.seek(std::io::SeekFrom::Start(0)).await?;
        device.write_all(&frame).await?;
        device.flush().await?;

        debug!(path = %self.path.display(), bytes = frame.len(), "Frame committed");
        Ok(())
    }
}

/// Encode `image` into a raw frame of exactly `width * height` pixels.
/// Pixels outside the image are filled with the background color.
pub fn encode_frame(
    image: &DynamicImage,
    width: u32,
    height: u32,
    pixel_format: PixelFormat,
) -> Vec<u8> {
    let rgb = image.to_rgb8();
    let mut frame =
        Vec::with_capacity(width as usize * height as usize * pixel_format.bytes_per_pixel());

    for y in 0..height {
        for x in 0..width {
            let [r, g, b] = if x < rgb.width() && y < rgb.height() {
                rgb.get_pixel(x, y).0
            } else {
                BACKGROUND
            };
            match pixel_format {
                PixelFormat::Bgra8888 => frame.extend_from_slice(&[b, g, r, 0xff]),
                PixelFormat::Rgb565 => frame.extend_from_slice(
                    &rgb565::Rgb565::from_rgb888_components(r, g, b).to_rgb565_le(),
                ),
            }
        }
    }

    frame
}
