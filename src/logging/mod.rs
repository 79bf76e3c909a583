//! Client event log.
//!
//! Errors are echoed to stderr and, together with a few outcome events,
//! appended as one JSON object per line to the event log
//! (`~/.emotion-console/events.jsonl` by default).

use std::fs::{OpenOptions, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use colored::Colorize;
use serde::{Deserialize, Serialize};

use crate::config::expand_home;
use crate::config::schema::LoggingConfig;

// ---------------------------------------------------------------------------
// Event entry
// ---------------------------------------------------------------------------

/// Which controller produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Charts,
    Webcam,
}

/// One line in the event log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientEvent {
    pub timestamp: String,
    pub source: Source,
    /// Short machine-readable kind, e.g. `"stats_refresh_failed"`.
    pub kind: String,
    pub message: String,
    /// Number of faces in a completed capture.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub faces: Option<usize>,
}

// ---------------------------------------------------------------------------
// Logger
// ---------------------------------------------------------------------------

/// Best-effort event sink shared by both controllers.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    path: Option<PathBuf>,
    echo: bool,
}

impl EventLog {
    /// Build from the `[logging]` config section. Errors are echoed to stderr.
    pub fn from_config(config: &LoggingConfig) -> Self {
        let path = if config.enabled {
            expand_home(&config.path)
        } else {
            None
        };
        Self { path, echo: true }
    }

    /// Log to `path` without echoing to stderr.
    pub fn to_file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            echo: false,
        }
    }

    /// A logger that drops everything.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Record a client-side fault, e.g. a failed fetch or camera denial.
    pub fn error(&self, source: Source, kind: &str, context: &str, err: &anyhow::Error) {
        let message = format!("{context}: {err:#}");
        if self.echo {
            eprintln!("{}", message.red());
        }
        self.append(source, kind, message, None);
    }

    /// Record a completed capture.
    pub fn capture_completed(&self, faces: usize) {
        self.append(
            Source::Webcam,
            "capture_completed",
            format!("{faces} face(s) analysed"),
            Some(faces),
        );
    }

    fn append(&self, source: Source, kind: &str, message: String, faces: Option<usize>) {
        let event = ClientEvent {
            timestamp: Utc::now().to_rfc3339(),
            source,
            kind: kind.to_string(),
            message,
            faces,
        };
        let _ = self.append_event(&event);
    }

    fn append_event(&self, event: &ClientEvent) -> anyhow::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        let json = serde_json::to_string(event)?;
        writeln!(file, "{json}")?;

        Ok(())
    }
}

/// Read all events from a log file, skipping malformed lines.
pub fn read_events(path: &Path) -> Vec<ClientEvent> {
    let Ok(content) = std::fs::read_to_string(path) else {
        return Vec::new();
    };
    content
        .lines()
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect()
}
