//! Creamline CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! creamline migrate
//!
//! # Seed the catalog with starter products
//! creamline seed
//!
//! # Moderate reviews
//! creamline reviews list-pending
//! creamline reviews approve <review-id>
//!
//! # Move an order through its lifecycle
//! creamline orders set-status <order-id> shipped
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Seed the catalog with starter products
//! - `reviews` - Review moderation
//! - `orders` - Order status management

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "creamline")]
#[command(author, version, about = "Creamline CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the catalog with starter products
    Seed,
    /// Review moderation
    Reviews {
        #[command(subcommand)]
        action: ReviewAction,
    },
    /// Order status management
    Orders {
        #[command(subcommand)]
        action: OrderAction,
    },
}

#[derive(Subcommand)]
enum ReviewAction {
    /// List reviews awaiting moderation
    ListPending,
    /// Approve a pending review
    Approve {
        /// Review id (UUID)
        id: String,
    },
}

#[derive(Subcommand)]
enum OrderAction {
    /// Transition an order to a new status
    SetStatus {
        /// Order id (UUID)
        id: String,

        /// Target status (pending, processing, shipped, delivered, cancelled)
        status: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed => commands::seed::run().await?,
        Commands::Reviews { action } => match action {
            ReviewAction::ListPending => commands::reviews::list_pending().await?,
            ReviewAction::Approve { id } => commands::reviews::approve(&id).await?,
        },
        Commands::Orders { action } => match action {
            OrderAction::SetStatus { id, status } => {
                commands::orders::set_status(&id, &status).await?;
            }
        },
    }
    Ok(())
}
