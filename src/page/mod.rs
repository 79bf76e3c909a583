//! The page a controller is mounted on.
//!
//! A [`PageContext`] stands in for the document: its path, the element ids it
//! contains, and the page-global JSON strings the server embedded in it.
//! Controllers probe it once at initialisation; a missing id only disables
//! the feature that depends on it.

use std::collections::HashSet;

/// Element ids the controllers look for.
pub mod ids {
    pub const PIE_CHART: &str = "emotionChart";
    pub const BAR_CHART: &str = "emotionBarChart";
    pub const VIDEO: &str = "webcam";
    pub const CANVAS: &str = "canvas";
    pub const START_BUTTON: &str = "startWebcam";
    pub const CAPTURE_BUTTON: &str = "captureImage";
    pub const RESULTS: &str = "webcamResults";

    pub const CHARTS: [&str; 2] = [PIE_CHART, BAR_CHART];
    pub const WEBCAM: [&str; 5] = [VIDEO, CANVAS, START_BUTTON, CAPTURE_BUTTON, RESULTS];
}

/// Path, element ids, and embedded data of one page.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    path: String,
    elements: HashSet<String>,
    /// JSON-encoded label array embedded by the server.
    emotions: Option<String>,
    /// JSON-encoded count array embedded by the server.
    counts: Option<String>,
}

impl PageContext {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// The dashboard page as served by the analyzer: both chart mount points.
    pub fn dashboard(emotions: impl Into<String>, counts: impl Into<String>) -> Self {
        Self::new("/dashboard")
            .with_elements(ids::CHARTS)
            .with_chart_data(emotions, counts)
    }

    /// The index page: the full webcam widget.
    pub fn webcam() -> Self {
        Self::new("/").with_elements(ids::WEBCAM)
    }

    pub fn with_elements<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.elements.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn without_element(mut self, id: &str) -> Self {
        self.elements.remove(id);
        self
    }

    pub fn with_chart_data(mut self, emotions: impl Into<String>, counts: impl Into<String>) -> Self {
        self.emotions = Some(emotions.into());
        self.counts = Some(counts.into());
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn has_element(&self, id: &str) -> bool {
        self.elements.contains(id)
    }

    /// Both embedded chart strings, if the page carries them.
    pub fn chart_data(&self) -> Option<(&str, &str)> {
        Some((self.emotions.as_deref()?, self.counts.as_deref()?))
    }

    /// Whether the page auto-refreshes its charts.
    pub fn is_dashboard(&self) -> bool {
        self.path.contains("dashboard")
    }
}
