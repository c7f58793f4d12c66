//! Montage CLI: project inspection and headless playback.
//!
//! Usage:
//!   montage info <PROJECT>             Show project information
//!   montage render-request <PROJECT>   Print the render request JSON
//!   montage check-upload <FILE>        Check a file against upload limits
//!   montage play <PROJECT>             Simulate playback of a project

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use montage_common::logging::init_logging;
use montage_common::EditorConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "montage",
    about = "Multi-clip video editing core",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to the standard location)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show project information
    Info {
        /// Path to the project JSON file
        path: PathBuf,
    },

    /// Print the render request for a project
    RenderRequest {
        /// Path to the project JSON file
        path: PathBuf,
    },

    /// Check a local file against the upload limits
    CheckUpload {
        /// File to check
        file: PathBuf,
    },

    /// Play a project against a simulated media backend
    Play {
        /// Path to the project JSON file
        path: PathBuf,

        /// Start position (seconds)
        #[arg(long, default_value = "0")]
        from: f64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => EditorConfig::load_from(path),
        None => EditorConfig::load(),
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    init_logging(&config.logging);

    match cli.command {
        Commands::Info { path } => commands::info::run(path, &config),
        Commands::RenderRequest { path } => commands::render_request::run(path, &config),
        Commands::CheckUpload { file } => commands::check_upload::run(file, &config),
        Commands::Play { path, from } => commands::play::run(path, from, &config).await,
    }
}
