//! Durance CLI - photo actions with durability tracking.
//!
//! A terminal front end for the Durance engine: keeps a gallery of photo
//! slots, shows each photo's action board, and applies actions. Primary
//! actions ask the configured model to describe the photo afterwards and
//! cost durability.
//!
//! # Usage
//!
//! ```bash
//! # List the gallery
//! durance gallery list
//!
//! # Put an image in slot 3
//! durance gallery assign 3 ~/Pictures/cat.jpg
//!
//! # Apply a primary action
//! durance act 3 primary Poke
//!
//! # Store an API key
//! durance config set-key gemini <KEY>
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Durance - photo actions with durability tracking.
#[derive(Parser, Debug)]
#[command(name = "durance")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// List photo slots or assign images to them
    Gallery(cli::gallery::GalleryArgs),

    /// Show the action board for a photo
    Actions(cli::act::ActionsArgs),

    /// Apply an action to a photo
    Act(cli::act::ActArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match durance_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `durance config path`."
            );
            durance_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Durance v{}", durance_core::VERSION);

    match cli.command {
        Commands::Gallery(args) => cli::gallery::execute(args, &config).await,
        Commands::Actions(args) => cli::act::show_board(args, &config).await,
        Commands::Act(args) => cli::act::execute(args, &config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
