//! Chart definitions in the chart-library configuration shape.
//!
//! [`build_config`] produces the JSON object a browser page hands to the
//! chart library, so the same definitions drive both the terminal renderer
//! and an embedding web page.

use serde_json::{Value, json};

use super::ChartDataset;
use crate::emotion::PALETTE;

pub const PIE_TITLE: &str = "Emotion Distribution";
pub const BAR_TITLE: &str = "Emotion Frequency";
pub const BAR_AXIS_TITLE: &str = "Number of Detections";

/// The two chart types the dashboard shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// Share of each emotion, legend on the right.
    Pie,
    /// Horizontal bars, no legend.
    Bar,
}

impl ChartKind {
    pub fn title(self) -> &'static str {
        match self {
            Self::Pie => PIE_TITLE,
            Self::Bar => BAR_TITLE,
        }
    }
}

/// Palette colour for the slice or bar at `index`. Wraps past the palette.
pub fn color_at(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// Share of `value` in `total` as a rounded whole percentage.
///
/// A zero total yields 0 rather than a division by zero.
pub fn percentage(value: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    (value as f64 / total as f64 * 100.0).round() as u64
}

/// Pie tooltip text: `"{label}: {value} ({percentage}%)"`.
pub fn tooltip_label(label: &str, value: u64, total: u64) -> String {
    format!("{label}: {value} ({}%)", percentage(value, total))
}

/// Chart-library configuration for a chart of `kind` over `dataset`.
pub fn build_config(kind: ChartKind, dataset: &ChartDataset) -> Value {
    let colors = PALETTE.to_vec();
    let title = json!({
        "display": true,
        "text": kind.title(),
        "font": { "size": 16 }
    });

    match kind {
        ChartKind::Pie => json!({
            "type": "pie",
            "data": {
                "labels": dataset.labels(),
                "datasets": [{
                    "data": dataset.counts(),
                    "backgroundColor": colors,
                    "borderWidth": 1
                }]
            },
            "options": {
                "responsive": true,
                "maintainAspectRatio": false,
                "plugins": {
                    "legend": { "position": "right" },
                    "title": title
                }
            }
        }),
        ChartKind::Bar => json!({
            "type": "bar",
            "data": {
                "labels": dataset.labels(),
                "datasets": [{
                    "label": BAR_AXIS_TITLE,
                    "data": dataset.counts(),
                    "backgroundColor": colors,
                    "borderWidth": 1
                }]
            },
            "options": {
                "responsive": true,
                "maintainAspectRatio": false,
                "indexAxis": "y",
                "plugins": {
                    "legend": { "display": false },
                    "title": title
                },
                "scales": {
                    "x": {
                        "beginAtZero": true,
                        "title": { "display": true, "text": BAR_AXIS_TITLE }
                    }
                }
            }
        }),
    }
}
