/// Configuration schema and defaults for emotion-console.
///
/// Defines the TOML-serializable configuration structure with all sections:
/// `[server]`, `[dashboard]`, `[webcam]`, and `[logging]`.
///
/// Every field has a sensible built-in default. Users only need to set the
/// values they want to override.
use std::time::Duration;

use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};

/// Shortest allowed pause between dashboard refreshes.
pub const MIN_REFRESH_SECS: u64 = 1;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level emotion-console configuration.
///
/// Maps directly to the `~/.emotion-console/config.toml` and
/// `.emotion-console.toml` file schemas. All sections and fields are
/// optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub server: ServerConfig,
    pub dashboard: DashboardConfig,
    pub webcam: WebcamConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [server]
// ---------------------------------------------------------------------------

/// Location of the EmotionAnalyzer server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL, e.g. `http://127.0.0.1:5000`.
    pub base_url: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            timeout_ms: 10_000,
        }
    }
}

// ---------------------------------------------------------------------------
// [dashboard]
// ---------------------------------------------------------------------------

/// Chart auto-refresh settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Seconds between stats refreshes on a dashboard page.
    pub refresh_interval_secs: u64,
    /// Path of the aggregated stats endpoint.
    pub stats_endpoint: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 30,
            stats_endpoint: "/api/emotion-stats".to_string(),
        }
    }
}

impl DashboardConfig {
    /// Pause between refreshes, never shorter than [`MIN_REFRESH_SECS`].
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(MIN_REFRESH_SECS))
    }
}

// ---------------------------------------------------------------------------
// [webcam]
// ---------------------------------------------------------------------------

/// Which camera the capture should prefer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Front-facing camera.
    #[default]
    User,
    /// Rear-facing camera.
    Environment,
}

impl std::fmt::Display for FacingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Environment => write!(f, "environment"),
        }
    }
}

/// Camera and capture settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebcamConfig {
    pub ideal_width: u32,
    pub ideal_height: u32,
    pub facing_mode: FacingMode,
    /// Path of the capture-analysis endpoint.
    pub capture_endpoint: String,
    /// JPEG quality (1-100) for captured frames.
    pub jpeg_quality: u8,
}

impl Default for WebcamConfig {
    fn default() -> Self {
        Self {
            ideal_width: 640,
            ideal_height: 480,
            facing_mode: FacingMode::User,
            capture_endpoint: "/webcam".to_string(),
            jpeg_quality: 92,
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Client event log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Whether events are appended to the log file.
    pub enabled: bool,
    /// Path to the event log. `~` is expanded to the home directory.
    pub path: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "~/.emotion-console/events.jsonl".to_string(),
        }
    }
}

impl ConsoleConfig {
    /// Reject values the schema accepts but the controllers cannot use.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.dashboard.refresh_interval_secs >= MIN_REFRESH_SECS,
            "dashboard.refresh_interval_secs must be at least {MIN_REFRESH_SECS}"
        );
        ensure!(
            (1..=100).contains(&self.webcam.jpeg_quality),
            "webcam.jpeg_quality must be between 1 and 100"
        );
        Ok(())
    }

    /// The annotated default config written by `config init`.
    pub fn default_toml() -> String {
        r#"# emotion-console configuration
# Values shown are the built-in defaults.

[server]
base_url = "http://127.0.0.1:5000"
timeout_ms = 10000

[dashboard]
# Only pages whose path contains "dashboard" auto-refresh.
refresh_interval_secs = 30
stats_endpoint = "/api/emotion-stats"

[webcam]
ideal_width = 640
ideal_height = 480
facing_mode = "user"            # "user" or "environment"
capture_endpoint = "/webcam"
jpeg_quality = 92

[logging]
enabled = true
path = "~/.emotion-console/events.jsonl"
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
