/// Webcam controller tests.
///
/// Camera, analyzer, and page are replaced with recording stubs so every
/// transition and every rendered results panel can be inspected.
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use anyhow::{Result, anyhow};
use image::RgbImage;

use emotion_console::api::{CaptureResponse, EmotionApi, EmotionStats};
use emotion_console::config::schema::WebcamConfig;
use emotion_console::logging::{EventLog, Source, read_events};
use emotion_console::page::{PageContext, ids};
use emotion_console::webcam::frame::JPEG_DATA_URL_PREFIX;
use emotion_console::webcam::render::LOADING_HTML;
use emotion_console::webcam::{
    CAMERA_ALERT, CaptureOutcome, MediaConstraints, MediaDevices, MediaStream, Transition,
    UiState, WebcamController, WebcamView,
};

// ---------------------------------------------------------------------------
// Stubs
// ---------------------------------------------------------------------------

/// Stream with two tracks whose live count is observable from outside.
struct FakeStream {
    live: Rc<Cell<usize>>,
}

impl MediaStream for FakeStream {
    fn video_size(&self) -> (u32, u32) {
        (64, 48)
    }

    fn current_frame(&mut self) -> Result<RgbImage> {
        Ok(RgbImage::from_pixel(64, 48, image::Rgb([90, 120, 150])))
    }

    fn stop_tracks(&mut self) {
        self.live.set(0);
    }

    fn live_tracks(&self) -> usize {
        self.live.get()
    }
}

struct FakeDevices {
    grant: bool,
    live: Rc<Cell<usize>>,
    requests: Rc<RefCell<Vec<MediaConstraints>>>,
}

impl MediaDevices for FakeDevices {
    fn get_user_media(&mut self, constraints: &MediaConstraints) -> Result<Box<dyn MediaStream>> {
        self.requests.borrow_mut().push(*constraints);
        if !self.grant {
            return Err(anyhow!("NotAllowedError: Permission denied"));
        }
        self.live.set(2);
        Ok(Box::new(FakeStream {
            live: Rc::clone(&self.live),
        }))
    }
}

/// Answers every upload with the same canned result.
struct FakeApi {
    reply: Result<CaptureResponse, String>,
    uploads: Rc<RefCell<Vec<String>>>,
}

impl EmotionApi for FakeApi {
    fn fetch_stats(&self) -> Result<EmotionStats> {
        unreachable!("the webcam never fetches stats")
    }

    fn submit_capture(&self, image_data_url: &str) -> Result<CaptureResponse> {
        self.uploads.borrow_mut().push(image_data_url.to_string());
        self.reply.clone().map_err(|msg| anyhow!(msg))
    }
}

#[derive(Default)]
struct RecordingView {
    uis: Vec<UiState>,
    alerts: Vec<String>,
    results: Vec<String>,
}

impl WebcamView for RecordingView {
    fn apply(&mut self, ui: &UiState) {
        self.uis.push(*ui);
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }

    fn show_results(&mut self, html: &str) {
        self.results.push(html.to_string());
    }
}

struct Harness {
    live: Rc<Cell<usize>>,
    requests: Rc<RefCell<Vec<MediaConstraints>>>,
    uploads: Rc<RefCell<Vec<String>>>,
}

type Controller = WebcamController<FakeDevices, FakeApi, RecordingView>;

fn controller_on(
    page: &PageContext,
    grant: bool,
    reply: Result<CaptureResponse, String>,
    log: EventLog,
) -> (Option<Controller>, Harness) {
    let harness = Harness {
        live: Rc::new(Cell::new(0)),
        requests: Rc::new(RefCell::new(Vec::new())),
        uploads: Rc::new(RefCell::new(Vec::new())),
    };
    let devices = FakeDevices {
        grant,
        live: Rc::clone(&harness.live),
        requests: Rc::clone(&harness.requests),
    };
    let api = FakeApi {
        reply,
        uploads: Rc::clone(&harness.uploads),
    };
    let controller = WebcamController::attach(
        page,
        devices,
        api,
        RecordingView::default(),
        &WebcamConfig::default(),
        log,
    );
    (controller, harness)
}

fn controller(grant: bool, reply: Result<CaptureResponse, String>) -> (Controller, Harness) {
    let (controller, harness) =
        controller_on(&PageContext::webcam(), grant, reply, EventLog::disabled());
    (controller.expect("webcam page wires the controller"), harness)
}

fn analyzed(body: &str) -> Result<CaptureResponse, String> {
    Ok(CaptureResponse::from_json(body).unwrap())
}

const TWO_FACES: &str = r#"{
    "success": true,
    "image_url": "/uploads/webcam_20240101_120000.jpg",
    "results": [
        {"emotions": {"angry": 0.1, "happy": 0.75, "sad": 0.15},
         "dominant_emotion": "happy", "confidence": 0.75},
        {"emotions": {"fear": 0.3, "neutral": 0.6, "surprise": 0.1},
         "dominant_emotion": "neutral", "confidence": 0.6}
    ]
}"#;

// ---------------------------------------------------------------------------
// Start / stop
// ---------------------------------------------------------------------------

#[test]
fn attach_shows_idle_ui() {
    let (webcam, _) = controller(true, analyzed(TWO_FACES));
    let ui = webcam.view().uis.last().copied().unwrap();
    assert_eq!(ui, UiState::for_state(&Default::default()));
    assert_eq!(ui.toggle_label, "Start Webcam");
}

#[test]
fn granted_start_enters_capturing() {
    let (mut webcam, harness) = controller(true, analyzed(TWO_FACES));

    assert!(matches!(webcam.toggle(), Transition::Started));

    assert!(webcam.is_capturing());
    let ui = *webcam.view().uis.last().unwrap();
    assert!(ui.video_visible);
    assert!(!ui.canvas_visible);
    assert!(ui.capture_enabled);
    assert_eq!(ui.toggle_label, "Stop Webcam");
    assert_eq!(ui.toggle_style.class(), "btn-danger");
    // Previous results are cleared.
    assert_eq!(webcam.view().results, vec![String::new()]);

    let requests = harness.requests.borrow();
    assert_eq!(requests.len(), 1);
    assert_eq!((requests[0].ideal_width, requests[0].ideal_height), (640, 480));
}

#[test]
fn denied_start_stays_idle_with_one_alert() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("events.jsonl");
    let (webcam, _) = controller_on(
        &PageContext::webcam(),
        false,
        analyzed(TWO_FACES),
        EventLog::to_file(&log_path),
    );
    let mut webcam = webcam.unwrap();

    assert!(matches!(webcam.toggle(), Transition::Denied(_)));

    assert!(!webcam.is_capturing());
    assert_eq!(webcam.view().alerts, vec![CAMERA_ALERT.to_string()]);
    let ui = *webcam.view().uis.last().unwrap();
    assert!(!ui.video_visible && !ui.capture_enabled);
    assert_eq!(ui.toggle_label, "Start Webcam");

    let events = read_events(&log_path);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].source, Source::Webcam);
    assert_eq!(events[0].kind, "camera_access_failed");
}

#[test]
fn stop_releases_every_track_and_restores_idle_ui() {
    let (mut webcam, harness) = controller(true, analyzed(TWO_FACES));
    webcam.toggle();
    assert_eq!(harness.live.get(), 2);

    assert!(matches!(webcam.toggle(), Transition::Stopped));

    assert_eq!(harness.live.get(), 0);
    assert!(!webcam.is_capturing());
    let ui = *webcam.view().uis.last().unwrap();
    assert!(!ui.video_visible);
    assert!(ui.canvas_visible);
    assert!(!ui.capture_enabled);
    assert_eq!(ui.toggle_label, "Start Webcam");
    assert_eq!(ui.toggle_style.class(), "btn-primary");
}

#[test]
fn dropping_the_controller_releases_the_camera() {
    let (mut webcam, harness) = controller(true, analyzed(TWO_FACES));
    webcam.start();
    assert_eq!(harness.live.get(), 2);

    drop(webcam);
    assert_eq!(harness.live.get(), 0);
}

#[test]
fn start_and_stop_are_idempotent() {
    let (mut webcam, harness) = controller(true, analyzed(TWO_FACES));
    assert!(webcam.start());
    assert!(webcam.start());
    assert_eq!(harness.requests.borrow().len(), 1);

    webcam.stop();
    webcam.stop();
    assert!(!webcam.is_capturing());
}

// ---------------------------------------------------------------------------
// Capture
// ---------------------------------------------------------------------------

#[test]
fn capture_while_idle_does_nothing() {
    let (mut webcam, harness) = controller(true, analyzed(TWO_FACES));
    assert_eq!(webcam.capture(), None);
    assert!(harness.uploads.borrow().is_empty());
    assert!(webcam.view().results.is_empty());
}

#[test]
fn capture_uploads_jpeg_data_url_after_showing_loading() {
    let (mut webcam, harness) = controller(true, analyzed(TWO_FACES));
    webcam.start();
    webcam.capture();

    let uploads = harness.uploads.borrow();
    assert_eq!(uploads.len(), 1);
    assert!(uploads[0].starts_with(JPEG_DATA_URL_PREFIX));

    let results = &webcam.view().results;
    assert_eq!(results[results.len() - 2], LOADING_HTML);
}

#[test]
fn capture_button_is_locked_while_in_flight() {
    let (mut webcam, _) = controller(true, analyzed(TWO_FACES));
    webcam.start();
    let before = webcam.view().uis.len();
    webcam.capture();

    let uis = &webcam.view().uis[before..];
    assert_eq!(uis.len(), 2);
    assert!(!uis[0].capture_enabled && uis[0].video_visible);
    assert!(uis[1].capture_enabled);
}

#[test]
fn no_faces_renders_only_the_notice() {
    let (mut webcam, _) = controller(
        true,
        analyzed(r#"{"success": true, "image_url": "/uploads/x.jpg", "results": []}"#),
    );
    webcam.start();

    assert_eq!(webcam.capture(), Some(CaptureOutcome::Analyzed { faces: 0 }));

    let html = webcam.view().results.last().unwrap();
    assert!(html.contains("No faces detected"));
    assert!(!html.contains("Face 1"));
    assert!(!html.contains("<img"));
}

#[test]
fn each_face_gets_a_card_with_sorted_emotions() {
    let (mut webcam, _) = controller(true, analyzed(TWO_FACES));
    webcam.start();

    assert_eq!(webcam.capture(), Some(CaptureOutcome::Analyzed { faces: 2 }));

    let html = webcam.view().results.last().unwrap();
    assert_eq!(html.matches(r#"<h6 class="mb-0">Face "#).count(), 2);
    assert!(html.contains("Face 1") && html.contains("Face 2"));
    assert!(html.contains(r#"src="/uploads/webcam_20240101_120000.jpg""#));
    assert!(html.contains("Confidence: 75.00%"));
    assert!(html.contains("Confidence: 60.00%"));
    assert_eq!(html.matches("align-items-center active").count(), 2);

    // First card: happy, sad, angry in that order.
    let first = &html[..html.find("Face 2").unwrap()];
    let pos = |label: &str| first.find(&format!("\n                    {label}\n")).unwrap();
    assert!(pos("happy") < pos("sad"));
    assert!(pos("sad") < pos("angry"));
}

#[test]
fn server_error_renders_message_without_cards() {
    let (mut webcam, _) = controller(
        true,
        analyzed(r#"{"error": "Could not decode image", "results": [{"emotions": {"happy": 1.0}}]}"#),
    );
    webcam.start();

    assert_eq!(
        webcam.capture(),
        Some(CaptureOutcome::Rejected("Could not decode image".to_string()))
    );

    let html = webcam.view().results.last().unwrap();
    assert_eq!(
        html,
        r#"<div class="alert alert-warning">Could not decode image</div>"#
    );
}

#[test]
fn transport_failure_renders_danger_panel_and_logs() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("events.jsonl");
    let (webcam, _) = controller_on(
        &PageContext::webcam(),
        true,
        Err("connection reset".to_string()),
        EventLog::to_file(&log_path),
    );
    let mut webcam = webcam.unwrap();
    webcam.start();

    assert!(matches!(webcam.capture(), Some(CaptureOutcome::Failed(_))));

    let html = webcam.view().results.last().unwrap();
    assert!(html.starts_with(r#"<div class="alert alert-danger">Error processing image: "#));
    assert!(html.contains("connection reset"));

    let events = read_events(&log_path);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, "capture_failed");
    // Camera stays on for another try.
    assert!(webcam.is_capturing());
}

// ---------------------------------------------------------------------------
// Page wiring
// ---------------------------------------------------------------------------

#[test]
fn page_without_video_or_toggle_is_not_wired() {
    for id in [ids::VIDEO, ids::START_BUTTON] {
        let page = PageContext::webcam().without_element(id);
        let (webcam, _) = controller_on(&page, true, analyzed(TWO_FACES), EventLog::disabled());
        assert!(webcam.is_none(), "missing #{id} should disable the webcam");
    }
}

#[test]
fn page_without_capture_button_cannot_capture() {
    let page = PageContext::webcam().without_element(ids::CAPTURE_BUTTON);
    let (webcam, harness) = controller_on(&page, true, analyzed(TWO_FACES), EventLog::disabled());
    let mut webcam = webcam.unwrap();

    assert!(webcam.start());
    assert_eq!(webcam.capture(), None);
    assert!(harness.uploads.borrow().is_empty());
}

#[test]
fn page_without_results_area_still_captures() {
    let page = PageContext::webcam().without_element(ids::RESULTS);
    let (webcam, harness) = controller_on(&page, true, analyzed(TWO_FACES), EventLog::disabled());
    let mut webcam = webcam.unwrap();
    webcam.start();

    assert_eq!(webcam.capture(), Some(CaptureOutcome::Analyzed { faces: 2 }));
    assert_eq!(harness.uploads.borrow().len(), 1);
    assert!(webcam.view().results.is_empty());
}
