use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use coinfolio::core::log::init_logging;
use coinfolio::{AppCommand, WatchlistAction};
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Buy into a token: fetch its price and add QUANTITY to the holding
    Add {
        /// Symbol, name or id of the token (e.g. DOGE, "Shiba Inu", bonk)
        token: String,
        quantity: f64,
    },
    /// Display holdings and their total value
    Summary {
        /// Revalue holdings at current prices
        #[arg(short, long)]
        live: bool,
    },
    /// Display the transaction log
    History {
        /// Only show transactions for this token
        #[arg(short, long)]
        token: Option<String>,
    },
    /// Fetch the current USD price of a token
    Price { token: String },
    /// Manage the watchlist
    Watchlist {
        #[command(subcommand)]
        action: Option<WatchlistCommands>,
    },
    /// List known tokens
    Tokens,
    /// Write holdings to a JSON file
    Export { path: PathBuf },
    /// Load holdings from a JSON file
    Import { path: PathBuf },
    /// Drop all cached prices
    ClearCache,
}

#[derive(Subcommand)]
enum WatchlistCommands {
    /// Show watched tokens with current prices
    List,
    /// Watch a token
    Add { token: String },
    /// Stop watching a token
    Remove { token: String },
}

impl From<Commands> for AppCommand {
    fn from(cmd: Commands) -> AppCommand {
        match cmd {
            Commands::Add { token, quantity } => AppCommand::Add { token, quantity },
            Commands::Summary { live } => AppCommand::Summary { live },
            Commands::History { token } => AppCommand::History { token },
            Commands::Price { token } => AppCommand::Price { token },
            Commands::Watchlist { action } => AppCommand::Watchlist(match action {
                None | Some(WatchlistCommands::List) => WatchlistAction::List,
                Some(WatchlistCommands::Add { token }) => WatchlistAction::Add(token),
                Some(WatchlistCommands::Remove { token }) => WatchlistAction::Remove(token),
            }),
            Commands::Tokens => AppCommand::Tokens,
            Commands::Export { path } => AppCommand::Export { path },
            Commands::Import { path } => AppCommand::Import { path },
            Commands::ClearCache => AppCommand::ClearCache,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // API keys (and RUST_LOG) may come from a .env file in the working directory
    dotenv::dotenv().ok();
    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => coinfolio::cli::setup::setup(),
        Some(cmd) => coinfolio::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
