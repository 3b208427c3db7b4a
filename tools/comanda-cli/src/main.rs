//! Comanda CLI - Command line front end for the restaurant ordering core.
//!
//! Commands:
//! - `comanda menu` - Show the priced menu
//! - `comanda quote` - Price a cart without placing it
//! - `comanda order place` - Place an order and send the kitchen message
//! - `comanda orders` - List and manage active orders
//! - `comanda config` - Manage configuration

mod commands;
mod config;
mod context;
mod dispatch;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use comanda_observability::{init_logging, LogLevel};

use commands::{ConfigArgs, MenuArgs, OrderArgs, OrdersArgs, QuoteArgs};

/// Comanda - Take and manage restaurant orders
#[derive(Parser)]
#[command(name = "comanda")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the menu with current prices
    Menu(MenuArgs),

    /// Price a cart without placing an order
    Quote(QuoteArgs),

    /// Place orders
    Order(OrderArgs),

    /// List and manage active orders
    Orders(OrdersArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let output = output::Output::new(cli.verbose, cli.json);

    let config_path = cli.config.as_deref();
    let ctx = context::Context::load(config_path, output)?;

    let mut logging = ctx.config.logging.clone();
    if cli.verbose {
        logging.level = logging.level.min(LogLevel::Debug);
    }
    if let Err(e) = init_logging(&logging) {
        ctx.output.warn(&format!("Logging disabled: {}", e));
    }

    let result = match cli.command {
        Commands::Menu(args) => commands::menu::run(args, &ctx).await,
        Commands::Quote(args) => commands::quote::run(args, &ctx).await,
        Commands::Order(args) => commands::order::run(args, &ctx).await,
        Commands::Orders(args) => commands::orders::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
