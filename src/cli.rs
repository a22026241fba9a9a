use clap::{Parser, Subcommand};
use hc_core::Instant;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hlsclip")]
#[command(author, version, about = "Cut before/after clips around an instant from a live HLS playlist")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract the clips ending at and starting at an instant
    Clip {
        /// Playlist URL or local path
        #[arg(short, long)]
        playlist: String,

        /// Reference instant, e.g. 2025-06-03T08:03:12+0530
        #[arg(short, long, value_parser = parse_instant)]
        at: Instant,

        /// Seconds of video before the instant (overrides config)
        #[arg(long)]
        before: Option<f64>,

        /// Seconds of video after the instant (overrides config)
        #[arg(long)]
        after: Option<f64>,

        /// Most segments to download per clip (overrides config)
        #[arg(long)]
        max_segments: Option<usize>,

        /// Directory the clips are written to (overrides config)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Fetch and parse a playlist and print its timeline
    Timeline {
        /// Playlist URL or local path
        #[arg(short, long)]
        playlist: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

fn parse_instant(value: &str) -> Result<Instant, String> {
    hc_playlist::parse_timestamp(value)
        .ok_or_else(|| format!("'{value}' is not a timestamp like 2025-06-03T08:03:12+05:30"))
}
