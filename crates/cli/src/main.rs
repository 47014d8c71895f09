//! SellerGlass CLI - Database migrations and account management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run engine database migrations
//! sg-cli migrate
//!
//! # List marketplace accounts
//! sg-cli accounts list
//!
//! # Opt an account out of syncing
//! sg-cli accounts disconnect 7b0c8f1e-4a2d-4f3b-9c6e-5d1a2b3c4d5e
//!
//! # Remove an account and everything synced for it
//! sg-cli accounts delete 7b0c8f1e-4a2d-4f3b-9c6e-5d1a2b3c4d5e
//!
//! # Run selected sync passes for one account
//! sg-cli sync 7b0c8f1e-4a2d-4f3b-9c6e-5d1a2b3c4d5e --orders --finances
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run engine database migrations
//! - `accounts` - List and manage marketplace accounts
//! - `sync` - Trigger sync passes for one account

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use sellerglass_core::{AccountId, OwnerId};
use sellerglass_engine::services::SyncSelection;

mod commands;

#[derive(Parser)]
#[command(name = "sg-cli")]
#[command(author, version, about = "SellerGlass CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run engine database migrations
    Migrate,
    /// List and manage marketplace accounts
    Accounts {
        #[command(subcommand)]
        action: AccountsAction,
    },
    /// Trigger sync passes for one account
    Sync {
        /// Marketplace account to sync
        account_id: AccountId,

        /// Sync the product catalog
        #[arg(long)]
        products: bool,

        /// Sync orders
        #[arg(long)]
        orders: bool,

        /// Sync financial events
        #[arg(long)]
        finances: bool,

        /// Re-fetch catalog details for SKUs that already have a product
        #[arg(long, requires = "products")]
        refresh_catalog: bool,
    },
}

#[derive(Subcommand)]
enum AccountsAction {
    /// List marketplace accounts
    List {
        /// Only show accounts belonging to this owner
        #[arg(short, long)]
        owner: Option<OwnerId>,
    },
    /// Opt an account out of syncing until it is reconnected
    Disconnect {
        /// Account to disconnect
        account_id: AccountId,
    },
    /// Delete an account and everything synced for it
    Delete {
        /// Account to delete
        account_id: AccountId,
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
        Commands::Migrate => commands::migrate::engine().await?,
        Commands::Accounts { action } => match action {
            AccountsAction::List { owner } => commands::accounts::list(owner).await?,
            AccountsAction::Disconnect { account_id } => {
                commands::accounts::disconnect(account_id).await?;
            }
            AccountsAction::Delete { account_id } => {
                commands::accounts::delete(account_id).await?;
            }
        },
        Commands::Sync {
            account_id,
            products,
            orders,
            finances,
            refresh_catalog,
        } => {
            // No pass flags means everything, matching the manual trigger API
            let selection = if products || orders || finances {
                SyncSelection {
                    products,
                    orders,
                    finances,
                    refresh_catalog,
                }
            } else {
                SyncSelection::FULL
            };
            commands::sync::run(account_id, selection).await?;
        }
    }
    Ok(())
}
