// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use qrscan::Config;
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "qrscan")]
#[command(about = "Scan QR codes from a camera session")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.config/qrscan/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a directory of frames, handling one code at a time
    Scan {
        /// Directory of PNG/JPEG frames, replayed in name order
        frames: PathBuf,

        /// Team name attached to every handled code
        #[arg(short, long)]
        team: Option<String>,

        /// Turn the torch on while scanning
        #[arg(long)]
        torch: bool,

        /// Do not take a snapshot after each code
        #[arg(long)]
        no_capture: bool,
    },

    /// Print every QR payload found in one image
    Decode {
        image: PathBuf,
    },

    /// List controllable flash LEDs
    Flash,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };

    // Set RUST_LOG to override, e.g. RUST_LOG=qrscan=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_filter)),
        )
        .with_target(true)
        .with_level(true)
        .init();

    match cli.command {
        Commands::Scan {
            frames,
            team,
            torch,
            no_capture,
        } => {
            let mut config = config;
            if let Some(team) = team {
                config.team_name = team;
            }
            if no_capture {
                config.capture_on_scan = false;
            }
            cli::scan_folder(&frames, config, torch).await
        }
        Commands::Decode { image } => cli::decode_image(image).await,
        Commands::Flash => cli::list_flash(),
    }
}
