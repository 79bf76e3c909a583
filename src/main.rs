use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use emotion_console::cli;

#[derive(Debug, Parser)]
#[command(name = "emotion-console")]
#[command(about = "Charts and webcam capture for the EmotionAnalyzer service")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Draw the emotion charts from page data; dashboard paths auto-refresh
    Dashboard {
        /// JSON array of emotion labels embedded in the page
        #[arg(long)]
        emotions: String,
        /// JSON array of detection counts, aligned with the labels
        #[arg(long)]
        counts: String,
        /// Page path; refresh is enabled when it contains "dashboard"
        #[arg(long, default_value = "/dashboard")]
        path: String,
        /// Stop after N refreshes instead of running forever
        #[arg(long)]
        ticks: Option<u64>,
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Fetch the current emotion statistics and draw both charts
    Stats {
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Capture one frame and analyse it
    Capture {
        /// Image file acting as the camera feed
        #[arg(long, conflicts_with = "device")]
        frame: Option<PathBuf>,
        /// Camera device index (needs the `camera` feature); defaults to
        /// the device matching `webcam.facing_mode`
        #[arg(long)]
        device: Option<u32>,
        /// Write the results HTML here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Check config, event log, and analyzer reachability
    Health,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the default config to ~/.emotion-console/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a dotted key, e.g. `server.base_url http://host:5000`
    Set { key: String, value: String },
    /// Restore the default config file
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();

    match app.command {
        Commands::Dashboard {
            emotions,
            counts,
            path,
            ticks,
            format,
        } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_dashboard(&emotions, &counts, &path, ticks, fmt)
        }
        Commands::Stats { format } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_stats(fmt)
        }
        Commands::Capture {
            frame,
            device,
            output,
        } => cli::run_capture(frame.as_deref(), device, output.as_deref()),
        Commands::Health => cli::run_health(),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}
