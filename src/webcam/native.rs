//! Hardware camera backend (`camera` feature).
//!
//! Opens a local capture device through `nokhwa`, asking for the format
//! closest to the requested resolution and decoding frames to RGB.

use anyhow::{Context, Result, anyhow, ensure};
use image::RgbImage;
use nokhwa::Camera;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    ApiBackend, CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType,
    Resolution,
};

use super::camera::{MediaConstraints, MediaDevices, MediaStream, pick_device};

/// Frame rate asked of the device alongside the resolution.
const REQUESTED_FPS: u32 = 30;

/// Local capture devices.
#[derive(Debug, Clone, Default)]
pub struct NativeDevices {
    /// Explicit device index; `None` picks one from the facing mode.
    index: Option<u32>,
}

impl NativeDevices {
    pub fn new(index: Option<u32>) -> Self {
        Self { index }
    }

    fn resolve_index(&self, constraints: &MediaConstraints) -> Result<u32> {
        if let Some(index) = self.index {
            return Ok(index);
        }

        let cameras = nokhwa::query(ApiBackend::Auto)
            .map_err(|e| anyhow!("failed to list cameras: {e}"))?;
        let available: Vec<u32> = cameras
            .iter()
            .filter_map(|info| info.index().as_index().ok())
            .collect();

        pick_device(constraints.facing_mode, &available).context("no camera connected")
    }
}

impl MediaDevices for NativeDevices {
    fn get_user_media(&mut self, constraints: &MediaConstraints) -> Result<Box<dyn MediaStream>> {
        let index = self.resolve_index(constraints)?;

        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(
            CameraFormat::new(
                Resolution::new(constraints.ideal_width, constraints.ideal_height),
                FrameFormat::MJPEG,
                REQUESTED_FPS,
            ),
        ));

        let mut camera = Camera::new(CameraIndex::Index(index), requested)
            .map_err(|e| anyhow!("failed to open camera {index}: {e}"))?;
        camera
            .open_stream()
            .map_err(|e| anyhow!("failed to start camera {index}: {e}"))?;

        Ok(Box::new(NativeStream { camera, live: true }))
    }
}

/// An open device stream.
pub struct NativeStream {
    camera: Camera,
    live: bool,
}

impl MediaStream for NativeStream {
    /// The resolution the device actually negotiated.
    fn video_size(&self) -> (u32, u32) {
        let resolution = self.camera.resolution();
        (resolution.width(), resolution.height())
    }

    fn current_frame(&mut self) -> Result<RgbImage> {
        ensure!(self.live, "stream has been stopped");

        let frame = self
            .camera
            .frame()
            .map_err(|e| anyhow!("failed to read camera frame: {e}"))?;
        let decoded = frame
            .decode_image::<RgbFormat>()
            .map_err(|e| anyhow!("failed to decode camera frame: {e}"))?;

        // nokhwa links its own `image` version; move the raw pixels across.
        let (width, height) = decoded.dimensions();
        RgbImage::from_raw(width, height, decoded.into_raw())
            .context("camera frame has the wrong buffer size")
    }

    fn stop_tracks(&mut self) {
        if self.live {
            let _ = self.camera.stop_stream();
            self.live = false;
        }
    }

    fn live_tracks(&self) -> usize {
        usize::from(self.live)
    }
}
