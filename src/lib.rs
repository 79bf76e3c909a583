//! Client for the EmotionAnalyzer face-emotion service.
//!
//! - [`charts`] — pie and bar charts of aggregated emotion counts, with
//!   dashboard auto-refresh
//! - [`webcam`] — camera toggle, frame capture, and per-face result markup
//! - [`api`] — HTTP client for the analyzer's two endpoints

pub mod api;
pub mod charts;
pub mod cli;
pub mod config;
pub mod emotion;
pub mod logging;
pub mod page;
pub mod webcam;
