//! Emotion statistics charts.
//!
//! [`ChartsController`] owns the dashboard's pie and bar charts. It is built
//! once per page from the label/count arrays the server embedded, and on a
//! dashboard page keeps both charts current by polling the stats endpoint.
//!
//! Drawing goes through the [`ChartSurface`] seam; see [`surface`] for the
//! terminal and JSON renderers.

pub mod config;
pub mod surface;

use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::api::{EmotionApi, EmotionStats};
use crate::logging::{EventLog, Source};
use crate::page::{PageContext, ids};

pub use config::ChartKind;

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

/// Positionally aligned (label, count) pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartDataset {
    entries: Vec<(String, u64)>,
}

impl ChartDataset {
    /// Pair up labels and counts. Unpaired trailing values are dropped.
    pub fn new(labels: Vec<String>, counts: Vec<u64>) -> Self {
        Self {
            entries: labels.into_iter().zip(counts).collect(),
        }
    }

    /// Parse the two JSON arrays a page embeds.
    pub fn from_embedded(emotions_json: &str, counts_json: &str) -> Result<Self> {
        let labels: Vec<String> =
            serde_json::from_str(emotions_json).context("embedded emotion labels are malformed")?;
        let counts: Vec<u64> =
            serde_json::from_str(counts_json).context("embedded emotion counts are malformed")?;
        Ok(Self::new(labels, counts))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(String, u64)] {
        &self.entries
    }

    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|(l, _)| l.as_str()).collect()
    }

    pub fn counts(&self) -> Vec<u64> {
        self.entries.iter().map(|(_, c)| *c).collect()
    }

    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, c)| c).sum()
    }
}

impl From<&EmotionStats> for ChartDataset {
    fn from(stats: &EmotionStats) -> Self {
        Self {
            entries: stats.entries().to_vec(),
        }
    }
}

// ---------------------------------------------------------------------------
// Chart
// ---------------------------------------------------------------------------

/// One mounted chart and its current data.
#[derive(Debug, Clone)]
pub struct Chart {
    kind: ChartKind,
    dataset: ChartDataset,
    /// Bumped on every data replacement.
    revision: u64,
}

impl Chart {
    pub fn new(kind: ChartKind, dataset: ChartDataset) -> Self {
        Self {
            kind,
            dataset,
            revision: 0,
        }
    }

    pub fn kind(&self) -> ChartKind {
        self.kind
    }

    pub fn dataset(&self) -> &ChartDataset {
        &self.dataset
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replace labels and values in place.
    pub fn update(&mut self, dataset: ChartDataset) {
        self.dataset = dataset;
        self.revision += 1;
    }

    /// Tooltip text for every slice, in dataset order.
    pub fn tooltip_labels(&self) -> Vec<String> {
        let total = self.dataset.total();
        self.dataset
            .entries()
            .iter()
            .map(|(label, value)| config::tooltip_label(label, *value, total))
            .collect()
    }

    /// Chart-library JSON configuration for the current data.
    pub fn to_config(&self) -> serde_json::Value {
        config::build_config(self.kind, &self.dataset)
    }
}

/// Something charts can be drawn on.
pub trait ChartSurface {
    fn draw(&mut self, chart: &Chart);
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// The charts mounted on one page.
#[derive(Debug)]
pub struct ChartsController {
    pie: Option<Chart>,
    bar: Option<Chart>,
    /// Set only on dashboard pages.
    refresh_interval: Option<Duration>,
    log: EventLog,
}

impl ChartsController {
    /// Mount whatever charts the page supports.
    ///
    /// A chart is skipped when its mount point or the embedded data is
    /// missing. Malformed embedded data is an error.
    pub fn init(page: &PageContext, refresh_interval: Duration, log: EventLog) -> Result<Self> {
        let wants_pie = page.has_element(ids::PIE_CHART);
        let wants_bar = page.has_element(ids::BAR_CHART);

        let dataset = match page.chart_data() {
            Some((emotions, counts)) if wants_pie || wants_bar => {
                Some(ChartDataset::from_embedded(emotions, counts)?)
            }
            _ => None,
        };

        let pie = dataset
            .clone()
            .filter(|_| wants_pie)
            .map(|d| Chart::new(ChartKind::Pie, d));
        let bar = dataset
            .filter(|_| wants_bar)
            .map(|d| Chart::new(ChartKind::Bar, d));

        Ok(Self {
            pie,
            bar,
            refresh_interval: page.is_dashboard().then_some(refresh_interval),
            log,
        })
    }

    pub fn pie(&self) -> Option<&Chart> {
        self.pie.as_ref()
    }

    pub fn bar(&self) -> Option<&Chart> {
        self.bar.as_ref()
    }

    /// Interval between refreshes, or `None` when the page does not poll.
    pub fn refresh_interval(&self) -> Option<Duration> {
        self.refresh_interval
    }

    fn charts_mut(&mut self) -> impl Iterator<Item = &mut Chart> {
        self.pie.iter_mut().chain(self.bar.iter_mut())
    }

    /// Draw every mounted chart.
    pub fn draw(&self, surface: &mut dyn ChartSurface) {
        for chart in self.pie.iter().chain(self.bar.iter()) {
            surface.draw(chart);
        }
    }

    /// Replace the data of every mounted chart with `stats`.
    pub fn apply_stats(&mut self, stats: &EmotionStats) {
        let dataset = ChartDataset::from(stats);
        for chart in self.charts_mut() {
            chart.update(dataset.clone());
        }
    }

    /// Fetch fresh stats and redraw. Failures are logged and reported as
    /// `false`; they never reach the user.
    pub fn refresh(&mut self, api: &dyn EmotionApi, surface: &mut dyn ChartSurface) -> bool {
        match api.fetch_stats() {
            Ok(stats) => {
                self.apply_stats(&stats);
                self.draw(surface);
                true
            }
            Err(err) => {
                self.log.error(
                    Source::Charts,
                    "stats_refresh_failed",
                    "Error updating charts",
                    &err,
                );
                false
            }
        }
    }

    /// Poll on the fixed interval, refreshing after each wait.
    ///
    /// Runs `max_ticks` times, or forever when `None`. Returns the number of
    /// ticks run; a page that does not poll returns 0 immediately.
    pub fn run_auto_refresh(
        &mut self,
        api: &dyn EmotionApi,
        surface: &mut dyn ChartSurface,
        max_ticks: Option<u64>,
    ) -> u64 {
        let Some(interval) = self.refresh_interval else {
            return 0;
        };

        let mut ticks = 0;
        while max_ticks.is_none_or(|max| ticks < max) {
            thread::sleep(interval);
            self.refresh(api, surface);
            ticks += 1;
        }
        ticks
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
