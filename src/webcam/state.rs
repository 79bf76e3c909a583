//! Idle/Capturing state machine and the UI it implies.

use super::camera::{MediaConstraints, MediaDevices, MediaStream};

pub const START_LABEL: &str = "Start Webcam";
pub const STOP_LABEL: &str = "Stop Webcam";

/// The active camera stream. Dropping the session stops every track.
pub struct CaptureSession {
    stream: Box<dyn MediaStream>,
}

impl CaptureSession {
    pub fn new(stream: Box<dyn MediaStream>) -> Self {
        Self { stream }
    }

    pub fn stream_mut(&mut self) -> &mut dyn MediaStream {
        self.stream.as_mut()
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.stream.stop_tracks();
    }
}

impl std::fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureSession")
            .field("video_size", &self.stream.video_size())
            .field("live_tracks", &self.stream.live_tracks())
            .finish()
    }
}

/// Whether a stream is attached to the video element.
#[derive(Debug, Default)]
pub enum CaptureState {
    #[default]
    Idle,
    Capturing(CaptureSession),
}

/// What a toggle did.
#[derive(Debug)]
pub enum Transition {
    /// Camera granted, now capturing.
    Started,
    /// Stream released, back to idle.
    Stopped,
    /// Camera refused or unavailable; still idle.
    Denied(anyhow::Error),
}

impl CaptureState {
    pub fn is_capturing(&self) -> bool {
        matches!(self, Self::Capturing(_))
    }

    /// The toggle button: start when idle, stop when capturing.
    pub fn toggle(
        self,
        devices: &mut dyn MediaDevices,
        constraints: &MediaConstraints,
    ) -> (Self, Transition) {
        match self {
            Self::Idle => match devices.get_user_media(constraints) {
                Ok(stream) => (
                    Self::Capturing(CaptureSession::new(stream)),
                    Transition::Started,
                ),
                Err(err) => (Self::Idle, Transition::Denied(err)),
            },
            // Dropping the session stops its tracks.
            Self::Capturing(session) => {
                drop(session);
                (Self::Idle, Transition::Stopped)
            }
        }
    }
}

/// Bootstrap style of the toggle button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonStyle {
    Primary,
    Danger,
}

impl ButtonStyle {
    pub fn class(self) -> &'static str {
        match self {
            Self::Primary => "btn-primary",
            Self::Danger => "btn-danger",
        }
    }
}

/// Visible state of the webcam widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiState {
    pub video_visible: bool,
    pub canvas_visible: bool,
    pub capture_enabled: bool,
    pub toggle_label: &'static str,
    pub toggle_style: ButtonStyle,
}

impl UiState {
    /// The UI for a state. Every element derives from the state alone.
    pub fn for_state(state: &CaptureState) -> Self {
        let capturing = state.is_capturing();
        Self {
            video_visible: capturing,
            canvas_visible: !capturing,
            capture_enabled: capturing,
            toggle_label: if capturing { STOP_LABEL } else { START_LABEL },
            toggle_style: if capturing {
                ButtonStyle::Danger
            } else {
                ButtonStyle::Primary
            },
        }
    }

    /// The same UI with capture locked while an upload is in flight.
    pub fn with_capture_in_flight(mut self) -> Self {
        self.capture_enabled = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webcam::camera::StillImageStream;
    use anyhow::anyhow;
    use image::RgbImage;

    struct Grant;

    impl MediaDevices for Grant {
        fn get_user_media(&mut self, _: &MediaConstraints) -> anyhow::Result<Box<dyn MediaStream>> {
            Ok(Box::new(StillImageStream::new(RgbImage::new(8, 6))))
        }
    }

    struct Deny;

    impl MediaDevices for Deny {
        fn get_user_media(&mut self, _: &MediaConstraints) -> anyhow::Result<Box<dyn MediaStream>> {
            Err(anyhow!("NotAllowedError: Permission denied"))
        }
    }

    #[test]
    fn idle_ui() {
        let ui = UiState::for_state(&CaptureState::Idle);
        assert!(!ui.video_visible);
        assert!(ui.canvas_visible);
        assert!(!ui.capture_enabled);
        assert_eq!(ui.toggle_label, "Start Webcam");
        assert_eq!(ui.toggle_style.class(), "btn-primary");
    }

    #[test]
    fn toggle_cycles_through_states() {
        let constraints = MediaConstraints::default();
        let (state, t) = CaptureState::Idle.toggle(&mut Grant, &constraints);
        assert!(matches!(t, Transition::Started));
        assert!(state.is_capturing());

        let ui = UiState::for_state(&state);
        assert!(ui.video_visible && ui.capture_enabled && !ui.canvas_visible);
        assert_eq!(ui.toggle_label, "Stop Webcam");
        assert_eq!(ui.toggle_style, ButtonStyle::Danger);

        let (state, t) = state.toggle(&mut Grant, &constraints);
        assert!(matches!(t, Transition::Stopped));
        assert!(!state.is_capturing());
    }

    #[test]
    fn denial_stays_idle() {
        let (state, t) = CaptureState::Idle.toggle(&mut Deny, &MediaConstraints::default());
        assert!(!state.is_capturing());
        assert!(matches!(t, Transition::Denied(_)));
    }

    #[test]
    fn in_flight_disables_capture_only() {
        let (state, _) = CaptureState::Idle.toggle(&mut Grant, &MediaConstraints::default());
        let ui = UiState::for_state(&state).with_capture_in_flight();
        assert!(!ui.capture_enabled);
        assert!(ui.video_visible);
    }
}
