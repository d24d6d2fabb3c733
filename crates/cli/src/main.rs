//! readchat CLI: the main entry point.
//!
//! Commands:
//! - `serve`: Start the web UI and HTTP API
//! - `ask`: Ask one question about a reading history CSV
//! - `ingest`: Print the books a CSV would yield, as JSON
//! - `config`: Print the default configuration file

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "readchat",
    about = "Ask an LLM about the books you have read",
    version
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
    /// Start the web UI and HTTP API
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Ask a single question about a reading history CSV
    Ask {
        /// Reading history CSV (header row plus up to 10 books)
        #[arg(long)]
        csv: PathBuf,

        /// Reuse a session id so the cache backend can recall earlier turns
        #[arg(long)]
        session: Option<String>,

        /// The question to ask
        question: String,
    },

    /// Parse a reading history CSV and print the books as JSON
    Ingest {
        /// Reading history CSV
        file: PathBuf,
    },

    /// Print the default configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine; real environment variables still apply.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Serve { port } => commands::serve::run(port).await?,
        Commands::Ask {
            csv,
            session,
            question,
        } => commands::ask::run(&csv, session, &question).await?,
        Commands::Ingest { file } => commands::ingest::run(&file)?,
        Commands::Config => commands::config_cmd::run(),
    }

    Ok(())
}
