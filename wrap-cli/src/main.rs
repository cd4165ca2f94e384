use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use wrap::{observability::init_tracing, Config};

mod commands;
mod widgets;

use commands::call::CallArgs;

/// wrap - serve the widgets API over HTTP or call it from the shell
#[derive(Parser)]
#[command(name = "wrap")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file, instead of the standard search path
    #[arg(long, short, global = true, value_name = "FILE", env = "WRAP_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to listen on, overriding configuration
        #[arg(long, short)]
        port: Option<u16>,
    },
    /// Run a single request and print the JSON response
    Call(CallArgs),
}

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Handle result
    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);

            // Show context if available
            for cause in e.chain().skip(1) {
                eprintln!("\n{} {}", "Caused by:".yellow(), cause);
            }

            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<i32> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => Config::load_for_service("wrap").context("Failed to load configuration")?,
    };

    init_tracing(&config).context("Failed to initialize logging")?;

    match cli.command {
        Commands::Serve { port } => commands::serve::execute(config, port).await,
        Commands::Call(args) => commands::call::execute(args, &config),
    }
}
