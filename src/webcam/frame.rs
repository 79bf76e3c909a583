//! Freezing a video frame and encoding it for upload.

use std::io::Cursor;

use anyhow::{Context, Result, ensure};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::RgbImage;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};

use super::camera::MediaStream;

pub const JPEG_DATA_URL_PREFIX: &str = "data:image/jpeg;base64,";

/// Off-screen canvas holding one captured frame.
#[derive(Debug, Clone)]
pub struct Canvas {
    image: RgbImage,
}

impl Canvas {
    /// Draw the stream's current frame onto a canvas sized to the video's
    /// native resolution.
    pub fn capture(stream: &mut dyn MediaStream) -> Result<Self> {
        let (width, height) = stream.video_size();
        ensure!(width > 0 && height > 0, "video has no frame size yet");

        let frame = stream.current_frame().context("failed to read video frame")?;
        let image = if frame.dimensions() == (width, height) {
            frame
        } else {
            imageops::resize(&frame, width, height, FilterType::Triangle)
        };

        Ok(Self { image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Encode as a base64 JPEG data URL. `quality` is clamped to 1..=100.
    pub fn to_data_url(&self, quality: u8) -> Result<String> {
        let mut jpeg = Cursor::new(Vec::new());
        JpegEncoder::new_with_quality(&mut jpeg, quality.clamp(1, 100))
            .encode_image(&self.image)
            .context("failed to encode frame as JPEG")?;

        Ok(format!(
            "{JPEG_DATA_URL_PREFIX}{}",
            STANDARD.encode(jpeg.into_inner())
        ))
    }
}
