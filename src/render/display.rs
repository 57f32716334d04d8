use async_trait::async_trait;
use image::DynamicImage;

use crate::types::RenderError;

/// Physical output device. Implementations push a whole frame per call.
#[async_trait]
pub trait Display: Send {
    /// Native resolution as (width, height)
    fn dimensions(&self) -> (u32, u32);

    /// Push the image to the panel and commit the update.
    async fn show(&mut self, image: &DynamicImage) -> Result<(), RenderError>;
}
