//! Colloquy CLI — the main entry point.
//!
//! Commands:
//! - `chat`     — Interactive conversation with the demo intents
//! - `ask`      — Resolve a single utterance
//! - `intents`  — List the registered intents
//! - `config`   — Show or check the engine configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod demo;

#[derive(Parser)]
#[command(
    name = "colloquy",
    about = "Colloquy — declarative dialogue engine",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ~/.colloquy/config.toml)
    #[arg(short, long, global = true, env = "COLLOQUY_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Talk to the demo intents
    Chat,

    /// Resolve one utterance and print the response
    Ask {
        /// The utterance
        #[arg(required = true)]
        utterance: Vec<String>,

        /// Print the response as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the registered intents
    Intents,

    /// Show the configuration
    Config {
        /// Print the built-in defaults instead of the loaded file
        #[arg(long)]
        defaults: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Chat => commands::chat::run(config).await?,
        Commands::Ask { utterance, json } => {
            commands::ask::run(config, &utterance.join(" "), json).await?
        }
        Commands::Intents => commands::intents::run(config)?,
        Commands::Config { defaults } => commands::config_cmd::run(config, defaults)?,
    }

    Ok(())
}
