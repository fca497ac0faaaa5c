//! MedTriage CLI — the main entry point.
//!
//! Commands:
//! - `chat` — Interactive consultation (full conversation replayed each turn)
//! - `ask`  — Single-shot analysis of one complaint, optionally with a file

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "medtriage",
    about = "MedTriage — conversational health triage for the Nigerian public",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive triage consultation
    Chat {
        /// Your location (Lagos, Abuja, Kano, Port Harcourt, Ibadan, Enugu,
        /// Kaduna, Other)
        #[arg(short, long)]
        location: Option<String>,

        /// Analyze each message on its own (enables attachments, no history)
        #[arg(short, long)]
        analysis: bool,
    },

    /// Ask a single question, optionally attaching a lab report or scan
    Ask {
        /// The complaint or question
        message: String,

        /// Path to a PDF, PNG, or JPEG to analyze alongside the question
        #[arg(short = 'f', long)]
        attach: Option<PathBuf>,

        /// Your location
        #[arg(short, long)]
        location: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Chat { location, analysis } => commands::chat::run(location, analysis).await?,
        Commands::Ask {
            message,
            attach,
            location,
        } => commands::ask::run(message, attach, location).await?,
    }

    Ok(())
}
