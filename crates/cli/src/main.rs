//! Celeste CLI: the main entry point.
//!
//! Commands:
//! - `serve`   Start the HTTP API server
//! - `ask`     Ask a single question from the terminal
//! - `status`  Show effective configuration
//! - `doctor`  Diagnose configuration and credentials

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "celeste",
    about = "Celeste — a cosmic guide with live weather context",
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
    /// Start the HTTP API server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Ask Celeste a single question
    Ask {
        /// The question
        query: String,

        /// Caller latitude (used when the question names no place)
        #[arg(long, allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Caller longitude
        #[arg(long, allow_negative_numbers = true)]
        lon: Option<f64>,

        /// IANA timezone for viewing times (e.g. "Asia/Tokyo")
        #[arg(long)]
        timezone: Option<String>,

        /// Print the assembled prompt before the reply
        #[arg(long)]
        show_prompt: bool,
    },

    /// Show effective configuration
    Status,

    /// Diagnose configuration and credentials
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Credentials may live in a local .env file.
    dotenvy::dotenv().ok();

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
        Commands::Serve { port } => commands::serve::run(port).await?,
        Commands::Ask {
            query,
            lat,
            lon,
            timezone,
            show_prompt,
        } => commands::ask::run(query, lat, lon, timezone, show_prompt).await?,
        Commands::Status => commands::status::run().await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
