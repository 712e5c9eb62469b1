use crate::error::CaptureError;
use crate::frame::FrameData;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{ColorType, ImageEncoder, RgbaImage};
use tracing::trace;

/// Prefix of a serialized PNG canvas
pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";
/// Serialization of a canvas with no pixels
pub const EMPTY_DATA_URL: &str = "data:,";

/// Offscreen drawing surface a preview frame is snapshotted into
#[derive(Debug, Clone)]
pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn is_empty(&self) -> bool {
        let (width, height) = self.dimensions();
        width == 0 || height == 0
    }

    /// Draw `frame` scaled to cover the whole canvas
    pub fn draw_frame(&mut self, frame: &FrameData) -> Result<(), CaptureError> {
        if self.is_empty() {
            return Ok(());
        }

        let (width, height) = self.dimensions();
        let source = frame.to_rgba_image()?;

        self.image = if source.dimensions() == (width, height) {
            source
        } else {
            imageops::resize(&source, width, height, FilterType::Triangle)
        };

        trace!(
            "Drew frame {} ({}x{}) onto {}x{} canvas",
            frame.id,
            frame.width,
            frame.height,
            width,
            height
        );
        Ok(())
    }

    /// Serialize as a `data:` URL holding a base64 PNG
    pub fn to_data_url(&self) -> Result<String, CaptureError> {
        if self.is_empty() {
            return Ok(EMPTY_DATA_URL.to_string());
        }

        let (width, height) = self.dimensions();
        let mut png = Vec::new();
        PngEncoder::new(&mut png)
            .write_image(self.image.as_raw(), width, height, ColorType::Rgba8)
            .map_err(|e| CaptureError::Encoding {
                details: e.to_string(),
            })?;

        Ok(format!("{}{}", PNG_DATA_URL_PREFIX, STANDARD.encode(png)))
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}

/// Strip the `data:` URL prefix, leaving the base64 payload (possibly empty)
pub fn payload_from_data_url(data_url: &str) -> &str {
    data_url
        .strip_prefix(PNG_DATA_URL_PREFIX)
        .or_else(|| data_url.strip_prefix(EMPTY_DATA_URL))
        .unwrap_or(data_url)
}
