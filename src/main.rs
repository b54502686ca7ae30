mod cli;
mod config;
mod hiring_client;

use std::io;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use eyre::{Result, WrapErr};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use crate::cli::chat::ChatContext;
use crate::config::Config;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Send a single message and exit
    #[arg(short, long)]
    input: Option<String>,

    /// Accept all prompts without asking
    #[arg(short, long)]
    yes: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Base URL of the hiring assistant server (overrides TALENTSCOUT_URL)
    #[arg(long)]
    server: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a chat session
    Chat {
        /// Send a single message and exit
        #[arg(short, long)]
        input: Option<String>,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,

        /// Base URL of the hiring assistant server (overrides TALENTSCOUT_URL)
        #[arg(long)]
        server: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load environment variables from .env file
    dotenv().ok();

    let cli = Cli::parse();

    // Default to chat if no subcommand is provided
    let (input, verbose, server) = match cli.command {
        Some(Commands::Chat { input, verbose, server }) => (input, verbose, server),
        None => (cli.input, cli.verbose, cli.server),
    };

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .wrap_err("Failed to set tracing subscriber")?;

    let config = Config::load(server)?;
    info!("Connecting to TalentScout at {}", config.server_url);

    let interactive = input.is_none();
    let mut chat_context = ChatContext::new(
        Box::new(io::stdout()),
        Box::new(io::stdout()),
        config,
        input,
        interactive,
        cli.yes,
    )?;

    chat_context.run().await
}
