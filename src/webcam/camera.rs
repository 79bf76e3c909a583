//! Camera access.
//!
//! [`MediaDevices`] grants [`MediaStream`]s for a set of constraints, the way
//! a browser's media-devices API does. [`StillImageDevices`] serves a fixed
//! image as the live feed; with the `camera` feature,
//! [`NativeDevices`](super::native::NativeDevices) opens a real device.

use std::path::PathBuf;

use anyhow::{Context, Result};
use image::RgbImage;
use image::imageops::FilterType;

use crate::config::schema::{FacingMode, WebcamConfig};

/// Requested video settings. The resolution is a preference, not a demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaConstraints {
    pub ideal_width: u32,
    pub ideal_height: u32,
    pub facing_mode: FacingMode,
}

impl Default for MediaConstraints {
    fn default() -> Self {
        Self {
            ideal_width: 640,
            ideal_height: 480,
            facing_mode: FacingMode::User,
        }
    }
}

impl MediaConstraints {
    pub fn from_config(config: &WebcamConfig) -> Self {
        Self {
            ideal_width: config.ideal_width,
            ideal_height: config.ideal_height,
            facing_mode: config.facing_mode,
        }
    }
}

/// A live video feed.
pub trait MediaStream {
    /// Native frame size of the feed.
    fn video_size(&self) -> (u32, u32);

    /// The frame currently showing.
    fn current_frame(&mut self) -> Result<RgbImage>;

    /// Stop every track. Calling it again is a no-op.
    fn stop_tracks(&mut self);

    /// Tracks that have not been stopped.
    fn live_tracks(&self) -> usize;
}

/// Grants camera streams.
pub trait MediaDevices {
    /// Ask for a stream. `Err` covers both denial and missing hardware.
    fn get_user_media(&mut self, constraints: &MediaConstraints) -> Result<Box<dyn MediaStream>>;
}

impl<T: MediaDevices + ?Sized> MediaDevices for Box<T> {
    fn get_user_media(&mut self, constraints: &MediaConstraints) -> Result<Box<dyn MediaStream>> {
        (**self).get_user_media(constraints)
    }
}

/// Choose a device index for a facing mode when none was given.
///
/// Built-in front cameras enumerate first; an external or rear camera is
/// taken to be the last one listed.
pub fn pick_device(facing_mode: FacingMode, available: &[u32]) -> Option<u32> {
    match facing_mode {
        FacingMode::User => available.first().copied(),
        FacingMode::Environment => available.last().copied(),
    }
}

// ---------------------------------------------------------------------------
// Still-image camera
// ---------------------------------------------------------------------------

/// A "camera" whose feed is a single image file.
#[derive(Debug, Clone)]
pub struct StillImageDevices {
    path: PathBuf,
}

impl StillImageDevices {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MediaDevices for StillImageDevices {
    fn get_user_media(&mut self, constraints: &MediaConstraints) -> Result<Box<dyn MediaStream>> {
        let image = image::open(&self.path)
            .with_context(|| format!("no camera frame available at {}", self.path.display()))?;

        // Negotiate down to the preferred resolution, keeping aspect ratio.
        let image = if image.width() > constraints.ideal_width
            || image.height() > constraints.ideal_height
        {
            image.resize(
                constraints.ideal_width,
                constraints.ideal_height,
                FilterType::Triangle,
            )
        } else {
            image
        };

        Ok(Box::new(StillImageStream {
            frame: image.to_rgb8(),
            live: true,
        }))
    }
}

/// Stream serving one fixed frame.
#[derive(Debug)]
pub struct StillImageStream {
    frame: RgbImage,
    live: bool,
}

impl StillImageStream {
    pub fn new(frame: RgbImage) -> Self {
        Self { frame, live: true }
    }
}

impl MediaStream for StillImageStream {
    fn video_size(&self) -> (u32, u32) {
        self.frame.dimensions()
    }

    fn current_frame(&mut self) -> Result<RgbImage> {
        anyhow::ensure!(self.live, "stream has been stopped");
        Ok(self.frame.clone())
    }

    fn stop_tracks(&mut self) {
        self.live = false;
    }

    fn live_tracks(&self) -> usize {
        usize::from(self.live)
    }
}
