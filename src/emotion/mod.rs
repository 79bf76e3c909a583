//! Emotion vocabulary and per-face detection results.
//!
//! The analysis server scores every detected face against seven emotions.
//! This module holds the chart palette for them and the result types decoded
//! from the `/webcam` endpoint.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Palette
// ---------------------------------------------------------------------------

/// Chart palette, listed in the order the server's model emits its labels.
///
/// Charts assign colours by slice position, not by label, so a dataset whose
/// labels arrive in a different order gets the colours in this order anyway.
pub const PALETTE: [&str; 7] = [
    "#dc3545", // angry - red
    "#20c997", // disgust - teal
    "#6f42c1", // fear - purple
    "#ffc107", // happy - yellow
    "#0dcaf0", // sad - cyan
    "#fd7e14", // surprise - orange
    "#6c757d", // neutral - gray
];

// ---------------------------------------------------------------------------
// Per-face results
// ---------------------------------------------------------------------------

/// Independent per-class confidence scores for one face, label → [0, 1].
///
/// Labels stay as strings so an unexpected label from the server is still
/// displayed rather than rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmotionSample(BTreeMap<String, f64>);

impl EmotionSample {
    pub fn score(&self, label: &str) -> Option<f64> {
        self.0.get(label).copied()
    }

    /// All (label, score) pairs sorted by descending score.
    ///
    /// The sort is stable, so equal scores keep label order.
    pub fn sorted_desc(&self) -> Vec<(&str, f64)> {
        let mut entries: Vec<(&str, f64)> = self.0.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        entries.sort_by(|a, b| b.1.total_cmp(&a.1));
        entries
    }

    /// The label with the highest score, if any.
    pub fn dominant(&self) -> Option<(&str, f64)> {
        self.sorted_desc().into_iter().next()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for EmotionSample {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// The server's analysis of one detected face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    #[serde(default)]
    pub emotions: EmotionSample,
    /// Dominant emotion as echoed by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dominant_emotion: Option<String>,
    /// Score of the dominant emotion as echoed by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl DetectionResult {
    /// Dominant label: the server's value, or the max-score label when the
    /// server omitted it.
    pub fn dominant(&self) -> &str {
        match &self.dominant_emotion {
            Some(label) => label,
            None => self.emotions.dominant().map(|(l, _)| l).unwrap_or(""),
        }
    }

    /// Confidence of the dominant emotion, falling back to its score.
    pub fn confidence(&self) -> f64 {
        self.confidence
            .or_else(|| self.emotions.score(self.dominant()))
            .unwrap_or(0.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
