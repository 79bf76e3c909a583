//! CLI command implementations.
//!
//! Provides subcommand handlers for:
//! - `emotion-console dashboard` — draw the charts from page data, auto-refresh
//! - `emotion-console stats` — fetch current stats and draw both charts
//! - `emotion-console capture` — one webcam capture from a camera or still image
//! - `emotion-console health` — config, log, and server reachability
//! - `emotion-console config show|init|set|reset` — configuration management

use std::fs;
use std::io::{self, Stdout};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::api::{AnalyzerClient, EmotionApi};
use crate::charts::surface::{JsonSurface, TerminalSurface};
use crate::charts::{ChartSurface, ChartsController};
use crate::config;
use crate::logging::EventLog;
use crate::page::{PageContext, ids};
use crate::webcam::camera::{MediaDevices, StillImageDevices};
use crate::webcam::{CaptureOutcome, UiState, WebcamController, WebcamView};

/// Output format for chart commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            _ => Self::Table,
        }
    }

    fn surface(self) -> Box<dyn ChartSurface> {
        match self {
            Self::Table => Box::new(TerminalSurface::new(io::stdout())),
            Self::Json => Box::new(JsonSurface::new(io::stdout())),
        }
    }
}

// ---------------------------------------------------------------------------
// emotion-console dashboard / stats
// ---------------------------------------------------------------------------

/// Mount the charts for a page and, on a dashboard page, keep refreshing.
pub fn run_dashboard(
    emotions: &str,
    counts: &str,
    path: &str,
    ticks: Option<u64>,
    format: OutputFormat,
) -> Result<()> {
    let cfg = config::load();
    let page = PageContext::new(path)
        .with_elements(ids::CHARTS)
        .with_chart_data(emotions, counts);

    let mut charts = ChartsController::init(
        &page,
        cfg.dashboard.refresh_interval(),
        EventLog::from_config(&cfg.logging),
    )?;

    let mut surface = format.surface();
    charts.draw(surface.as_mut());

    if let Some(interval) = charts.refresh_interval() {
        if format == OutputFormat::Table {
            println!(
                "{}",
                format!("Refreshing every {}s. Press Ctrl+C to stop.", interval.as_secs()).dimmed()
            );
        }
        let client = AnalyzerClient::from_config(&cfg);
        charts.run_auto_refresh(&client, surface.as_mut(), ticks);
    }

    Ok(())
}

/// Fetch the current stats once and draw both charts.
pub fn run_stats(format: OutputFormat) -> Result<()> {
    let cfg = config::load();
    let client = AnalyzerClient::from_config(&cfg);
    let stats = client
        .fetch_stats()
        .with_context(|| format!("could not fetch stats from {}", client.stats_url()))?;

    let page = PageContext::new("/stats")
        .with_elements(ids::CHARTS)
        .with_chart_data("[]", "[]");
    let mut charts = ChartsController::init(&page, Duration::ZERO, EventLog::disabled())?;
    charts.apply_stats(&stats);

    let mut surface = format.surface();
    charts.draw(surface.as_mut());
    Ok(())
}

// ---------------------------------------------------------------------------
// emotion-console capture
// ---------------------------------------------------------------------------

/// Webcam view printing state changes to the terminal and keeping the
/// latest results markup.
pub struct ConsoleView {
    results: String,
    out: Stdout,
}

impl ConsoleView {
    pub fn new() -> Self {
        Self {
            results: String::new(),
            out: io::stdout(),
        }
    }

    pub fn results(&self) -> &str {
        &self.results
    }
}

impl Default for ConsoleView {
    fn default() -> Self {
        Self::new()
    }
}

impl WebcamView for ConsoleView {
    fn apply(&mut self, ui: &UiState) {
        use std::io::Write;
        let video = if ui.video_visible { "live" } else { "hidden" };
        let capture = if ui.capture_enabled { "enabled" } else { "disabled" };
        let _ = writeln!(
            self.out,
            "  [{}] video {video}, capture {capture}",
            ui.toggle_label.bold()
        );
    }

    fn alert(&mut self, message: &str) {
        eprintln!("{} {}", "ALERT:".red().bold(), message);
    }

    fn show_results(&mut self, html: &str) {
        self.results = html.to_string();
    }
}

/// The camera for a capture: the still image when one is given, otherwise a
/// local device.
fn capture_devices(frame: Option<&Path>, device: Option<u32>) -> Result<Box<dyn MediaDevices>> {
    match frame {
        Some(path) => Ok(Box::new(StillImageDevices::new(path))),
        None => native_devices(device),
    }
}

#[cfg(feature = "camera")]
fn native_devices(device: Option<u32>) -> Result<Box<dyn MediaDevices>> {
    Ok(Box::new(crate::webcam::native::NativeDevices::new(device)))
}

#[cfg(not(feature = "camera"))]
fn native_devices(_device: Option<u32>) -> Result<Box<dyn MediaDevices>> {
    anyhow::bail!("built without camera support: pass --frame IMAGE or rebuild with `--features camera`")
}

/// Start the camera, capture once, write the results, stop.
pub fn run_capture(frame: Option<&Path>, device: Option<u32>, output: Option<&Path>) -> Result<()> {
    let cfg = config::load();
    let client = AnalyzerClient::from_config(&cfg);

    let mut webcam = WebcamController::attach(
        &PageContext::webcam(),
        capture_devices(frame, device)?,
        client,
        ConsoleView::new(),
        &cfg.webcam,
        EventLog::from_config(&cfg.logging),
    )
    .context("webcam page is missing its video element")?;

    println!("{}", "Webcam Capture".bold().cyan());
    println!("{}", "=".repeat(40));

    if !webcam.start() {
        anyhow::bail!("camera unavailable");
    }

    let outcome = webcam.capture();
    webcam.stop();

    match outcome {
        Some(CaptureOutcome::Analyzed { faces: 0 }) => {
            println!("{}", "No faces detected.".yellow());
        }
        Some(CaptureOutcome::Analyzed { faces }) => {
            println!("{} {faces}", "Faces analysed:".bold().green());
        }
        Some(CaptureOutcome::Rejected(error)) => {
            println!("{} {error}", "Server refused frame:".bold().yellow());
        }
        Some(CaptureOutcome::Failed(message)) => {
            println!("{} {message}", "Capture failed:".bold().red());
        }
        None => {}
    }

    let html = webcam.view().results();
    match output {
        Some(path) => {
            fs::write(path, html)
                .with_context(|| format!("failed to write results to {}", path.display()))?;
            println!("Results written to {}", path.display());
        }
        None => println!("{html}"),
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// emotion-console health
// ---------------------------------------------------------------------------

/// Report config, event log, and server reachability.
pub fn run_health() -> Result<()> {
    println!("{}", "emotion-console Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    let cfg = config::load();
    let global = config::global_config_file();
    let global_exists = global.as_ref().is_some_and(|p| p.exists());
    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.emotion-console/config.toml found"
        } else {
            "not found (run `emotion-console config init` to create)"
        },
    );

    let log = EventLog::from_config(&cfg.logging);
    match log.path() {
        Some(path) => print_health_item(
            "Event log",
            true,
            &format!(
                "{} ({} events)",
                path.display(),
                crate::logging::read_events(path).len()
            ),
        ),
        None => print_health_item("Event log", false, "disabled"),
    }

    let client = AnalyzerClient::from_config(&cfg);
    match client.fetch_stats() {
        Ok(stats) => print_health_item(
            "Analyzer",
            true,
            &format!(
                "reachable at {} ({} emotions tracked)",
                cfg.server.base_url,
                stats.entries().len()
            ),
        ),
        Err(err) => print_health_item("Analyzer", false, &format!("{err:#}")),
    }

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok { "OK".green().bold() } else { "--".yellow().bold() };
    println!("  [{status}] {name:<16} {detail}");
}

// ---------------------------------------------------------------------------
// emotion-console config
// ---------------------------------------------------------------------------

pub fn run_config_show() -> Result<()> {
    println!("{}", "Effective configuration".bold().cyan());
    println!("{}", "=".repeat(40));
    print!("{}", config::show_effective_config()?);
    Ok(())
}

pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!("{} {}", "Wrote".green(), path.display());
    Ok(())
}

pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} {key} = {value}", "Set".green());
    Ok(())
}

pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!("{} {}", "Reset".green(), path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
