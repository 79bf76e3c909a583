//! Chart renderers.
//!
//! - [`TerminalSurface`] — coloured legend for the pie, horizontal bars for
//!   the bar chart
//! - [`JsonSurface`] — one JSON document per chart (configuration plus the
//!   pie tooltips), for pages that mount the charts themselves

use std::io::Write;

use colored::Colorize;
use serde_json::json;

use super::config::{self, BAR_AXIS_TITLE};
use super::{Chart, ChartKind, ChartSurface};

/// Widest bar in columns.
const BAR_WIDTH: usize = 40;

/// Parse `#rrggbb` into RGB components.
fn hex_rgb(hex: &str) -> (u8, u8, u8) {
    let hex = hex.trim_start_matches('#');
    let channel = |i: usize| {
        hex.get(i..i + 2)
            .and_then(|c| u8::from_str_radix(c, 16).ok())
            .unwrap_or(0)
    };
    (channel(0), channel(2), channel(4))
}

fn paint(text: &str, index: usize) -> String {
    let (r, g, b) = hex_rgb(config::color_at(index));
    text.truecolor(r, g, b).to_string()
}

/// Length of a bar for `value` when `max` fills [`BAR_WIDTH`].
fn bar_len(value: u64, max: u64) -> usize {
    if max == 0 {
        return 0;
    }
    ((value as f64 / max as f64) * BAR_WIDTH as f64).round() as usize
}

// ---------------------------------------------------------------------------
// Terminal
// ---------------------------------------------------------------------------

/// Draws charts as text on a writer (stdout in the CLI).
pub struct TerminalSurface<W: Write> {
    out: W,
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn draw_pie(&mut self, chart: &Chart) {
        for (i, tooltip) in chart.tooltip_labels().iter().enumerate() {
            let _ = writeln!(self.out, "  {} {tooltip}", paint("●", i));
        }
    }

    fn draw_bar(&mut self, chart: &Chart) {
        let entries = chart.dataset().entries();
        let max = entries.iter().map(|(_, c)| *c).max().unwrap_or(0);
        let label_width = entries.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);

        for (i, (label, count)) in entries.iter().enumerate() {
            let bar = "█".repeat(bar_len(*count, max));
            let _ = writeln!(self.out, "  {label:>label_width$} │{} {count}", paint(&bar, i));
        }
        let _ = writeln!(self.out, "  {:>label_width$}  {}", "", BAR_AXIS_TITLE.dimmed());
    }
}

impl<W: Write> ChartSurface for TerminalSurface<W> {
    fn draw(&mut self, chart: &Chart) {
        let _ = writeln!(self.out, "{}", chart.kind().title().bold().cyan());
        let _ = writeln!(self.out, "{}", "=".repeat(BAR_WIDTH + 20));

        if chart.dataset().is_empty() {
            let _ = writeln!(self.out, "  {}", "No detections yet.".yellow());
        } else {
            match chart.kind() {
                ChartKind::Pie => self.draw_pie(chart),
                ChartKind::Bar => self.draw_bar(chart),
            }
        }
        let _ = writeln!(self.out);
    }
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// Writes each chart as a single-line JSON document.
pub struct JsonSurface<W: Write> {
    out: W,
}

impl<W: Write> JsonSurface<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ChartSurface for JsonSurface<W> {
    fn draw(&mut self, chart: &Chart) {
        let mount = match chart.kind() {
            ChartKind::Pie => crate::page::ids::PIE_CHART,
            ChartKind::Bar => crate::page::ids::BAR_CHART,
        };
        let tooltips = match chart.kind() {
            ChartKind::Pie => chart.tooltip_labels(),
            ChartKind::Bar => Vec::new(),
        };
        let doc = json!({
            "element": mount,
            "revision": chart.revision(),
            "config": chart.to_config(),
            "tooltips": tooltips,
        });
        let _ = writeln!(self.out, "{doc}");
    }
}
