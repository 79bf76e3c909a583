//! Webcam capture and per-face emotion results.
//!
//! [`WebcamController`] wires the start/stop toggle and the capture action
//! of one page. The camera, the analysis server, and the page's visible
//! elements are all reached through traits ([`MediaDevices`], [`EmotionApi`],
//! [`WebcamView`]) so the same controller runs in the CLI and in tests.
//!
//! A capture borrows the controller mutably for its whole round trip and
//! locks the capture button until the response is rendered, so two uploads
//! can never overlap.

pub mod camera;
pub mod frame;
#[cfg(feature = "camera")]
pub mod native;
pub mod render;
pub mod state;

use anyhow::Result;

use crate::api::{CaptureResponse, EmotionApi};
use crate::config::schema::WebcamConfig;
use crate::logging::{EventLog, Source};
use crate::page::{PageContext, ids};

pub use camera::{MediaConstraints, MediaDevices, MediaStream};
pub use state::{CaptureState, Transition, UiState};

use frame::Canvas;

pub const CAMERA_ALERT: &str = "Error accessing webcam. Please make sure you have a webcam connected and have granted permission to use it.";

/// The page elements the controller drives.
pub trait WebcamView {
    /// Reflect the current video/canvas/button state.
    fn apply(&mut self, ui: &UiState);

    /// Blocking user-facing alert.
    fn alert(&mut self, message: &str);

    /// Replace the contents of the results area.
    fn show_results(&mut self, html: &str);
}

/// How a capture ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// The server returned an `error` field.
    Rejected(String),
    /// Analysis ran; the count may be zero.
    Analyzed { faces: usize },
    /// The frame could not be captured or the round trip failed.
    Failed(String),
}

/// Start/stop and capture for one page.
pub struct WebcamController<D, A, V> {
    devices: D,
    api: A,
    view: V,
    state: CaptureState,
    constraints: MediaConstraints,
    jpeg_quality: u8,
    /// Page has both the capture button and the canvas.
    can_capture: bool,
    /// Page has the results container.
    has_results: bool,
    log: EventLog,
}

impl<D: MediaDevices, A: EmotionApi, V: WebcamView> WebcamController<D, A, V> {
    /// Wire the controller to a page.
    ///
    /// Returns `None` when the page has no video element or no toggle
    /// button. Otherwise the view is put in its idle appearance.
    pub fn attach(
        page: &PageContext,
        devices: D,
        api: A,
        view: V,
        settings: &WebcamConfig,
        log: EventLog,
    ) -> Option<Self> {
        if !page.has_element(ids::VIDEO) || !page.has_element(ids::START_BUTTON) {
            return None;
        }

        let mut controller = Self {
            devices,
            api,
            view,
            state: CaptureState::Idle,
            constraints: MediaConstraints::from_config(settings),
            jpeg_quality: settings.jpeg_quality,
            can_capture: page.has_element(ids::CAPTURE_BUTTON) && page.has_element(ids::CANVAS),
            has_results: page.has_element(ids::RESULTS),
            log,
        };
        controller.render_ui();
        Some(controller)
    }

    pub fn state(&self) -> &CaptureState {
        &self.state
    }

    pub fn is_capturing(&self) -> bool {
        self.state.is_capturing()
    }

    pub fn ui(&self) -> UiState {
        UiState::for_state(&self.state)
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    fn render_ui(&mut self) {
        let ui = self.ui();
        self.view.apply(&ui);
    }

    fn show_results(&mut self, html: &str) {
        if self.has_results {
            self.view.show_results(html);
        }
    }

    /// Click on the toggle button.
    pub fn toggle(&mut self) -> Transition {
        let current = std::mem::take(&mut self.state);
        let (next, transition) = current.toggle(&mut self.devices, &self.constraints);
        self.state = next;

        match &transition {
            Transition::Started => self.show_results(""),
            Transition::Stopped => {}
            Transition::Denied(err) => {
                self.log.error(
                    Source::Webcam,
                    "camera_access_failed",
                    "Error accessing webcam",
                    err,
                );
                self.view.alert(CAMERA_ALERT);
            }
        }

        self.render_ui();
        transition
    }

    /// Start the camera if idle. Returns whether the camera is running.
    pub fn start(&mut self) -> bool {
        if !self.is_capturing() {
            self.toggle();
        }
        self.is_capturing()
    }

    /// Stop the camera if running.
    pub fn stop(&mut self) {
        if self.is_capturing() {
            self.toggle();
        }
    }

    /// Click on the capture button.
    ///
    /// Returns `None` when there is nothing to capture (idle, or the page has
    /// no capture button).
    pub fn capture(&mut self) -> Option<CaptureOutcome> {
        if !self.can_capture || !self.is_capturing() {
            return None;
        }

        self.show_results(render::LOADING_HTML);
        let busy = self.ui().with_capture_in_flight();
        self.view.apply(&busy);

        let response = self
            .encode_frame()
            .and_then(|data_url| self.api.submit_capture(&data_url));

        let outcome = match response {
            Ok(CaptureResponse::Rejected { error }) => {
                self.show_results(&render::server_error(&error));
                CaptureOutcome::Rejected(error)
            }
            Ok(CaptureResponse::Analyzed { image_url, results }) => {
                self.show_results(&render::results(&image_url, &results));
                self.log.capture_completed(results.len());
                CaptureOutcome::Analyzed {
                    faces: results.len(),
                }
            }
            Err(err) => {
                self.log.error(
                    Source::Webcam,
                    "capture_failed",
                    "Error processing webcam image",
                    &err,
                );
                let message = format!("{err:#}");
                self.show_results(&render::transport_error(&message));
                CaptureOutcome::Failed(message)
            }
        };

        self.render_ui();
        Some(outcome)
    }

    fn encode_frame(&mut self) -> Result<String> {
        let CaptureState::Capturing(session) = &mut self.state else {
            anyhow::bail!("webcam is not running");
        };
        Canvas::capture(session.stream_mut())?.to_data_url(self.jpeg_quality)
    }
}
