//! Till CLI - a terminal point-of-sale register.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! till catalog --search product --category "Category A"
//!
//! # Build a cart (state is kept in local storage between runs)
//! till cart add 1
//! till cart scan 8901000000028
//! till cart qty 1 2
//! till cart show
//!
//! # Check out
//! till checkout --notes "paid cash"
//!
//! # Interactive register with undo
//! till shell
//! ```
//!
//! # Commands
//!
//! - `catalog` - List catalog items, optionally filtered
//! - `cart` - Show or change the cart
//! - `filter` - Set the saved search text or category
//! - `checkout` - Pay for the cart and print a receipt
//! - `shell` - Run an interactive register session
//! - `reset` - Erase all saved register state

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "till")]
#[command(author, version, about = "Till point-of-sale register")]
struct Cli {
    /// Load the product catalog from a JSON file instead of the built-in one
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog items
    Catalog {
        /// Case-insensitive name search (defaults to the saved search)
        #[arg(short, long)]
        search: Option<String>,

        /// Only show this category (defaults to the saved category)
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Show or change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Set the saved catalog filters
    Filter {
        #[command(subcommand)]
        target: FilterTarget,
    },
    /// Pay for the cart and print a receipt
    Checkout {
        /// Order notes printed on the receipt
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// Run an interactive register session
    Shell,
    /// Erase all saved register state
    Reset,
}

#[derive(Subcommand)]
enum CartAction {
    /// Print the cart and its totals
    Show,
    /// Add one unit of a catalog item
    Add {
        /// Catalog item id
        id: String,
    },
    /// Add the item with this barcode
    Scan {
        /// Scanned barcode
        code: String,
    },
    /// Remove an item's line
    Remove {
        /// Catalog item id
        id: String,
    },
    /// Change an item's quantity by a signed amount
    Qty {
        /// Catalog item id
        id: String,

        /// Amount to add (negative to subtract)
        #[arg(allow_hyphen_values = true)]
        delta: i64,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum FilterTarget {
    /// Set the search text (omit to clear)
    Search {
        /// Search text
        text: Option<String>,
    },
    /// Select a category (omit to clear)
    Category {
        /// Category name
        name: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("till_register=info,till_cli=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = commands::open_session(cli.catalog.as_deref())?;

    match cli.command {
        Commands::Catalog { search, category } => {
            commands::catalog::list(&session, search.as_deref(), category.as_deref());
        }
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&session),
            CartAction::Add { id } => commands::cart::add(&mut session, &id),
            CartAction::Scan { code } => commands::cart::scan(&mut session, &code),
            CartAction::Remove { id } => commands::cart::remove(&mut session, &id),
            CartAction::Qty { id, delta } => commands::cart::quantity(&mut session, &id, delta),
            CartAction::Clear => commands::cart::clear(&mut session),
        },
        Commands::Filter { target } => match target {
            FilterTarget::Search { text } => {
                commands::filter::search(&mut session, text.unwrap_or_default());
            }
            FilterTarget::Category { name } => commands::filter::category(&mut session, name),
        },
        Commands::Checkout { notes } => commands::checkout::run(&mut session, notes).await?,
        Commands::Shell => commands::shell::run(&mut session).await?,
        Commands::Reset => commands::reset(&mut session)?,
    }
    Ok(())
}
