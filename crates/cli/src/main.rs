//! Shopfront CLI - session-store migrations and catalog browsing.
//!
//! # Usage
//!
//! ```bash
//! # Create the session store schema
//! shopfront-cli migrate
//!
//! # Page through a collection, filtered and sorted like the storefront does
//! shopfront-cli browse summer --filter color=Red --filter size=M --sort price-low-high
//!
//! # Search instead of browsing a collection
//! shopfront-cli browse --search "linen shirt" --pages 2
//!
//! # Show the facets offered by the first page of a collection
//! shopfront-cli facets summer
//! ```
//!
//! # Commands
//!
//! - `migrate` - Create or update the `tower_sessions` table
//! - `browse` - Run the listing pipeline over one or more pages
//! - `facets` - Print the facet counts for one page

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "shopfront-cli")]
#[command(author, version, about = "Shopfront CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or update the session store schema
    Migrate,
    /// List products through the facet, filter and sort pipeline
    Browse {
        /// Collection handle to browse
        #[arg(required_unless_present = "search", conflicts_with = "search")]
        handle: Option<String>,

        /// Search term to list results for instead of a collection
        #[arg(short, long)]
        search: Option<String>,

        /// Sort key (`featured`, `relevance`, `newest`, `best-selling`,
        /// `price-low-high`, `price-high-low`)
        #[arg(long)]
        sort: Option<String>,

        /// Filter as `param=value`, e.g. `color=Red` or `price_min=10`
        #[arg(short, long = "filter", value_parser = commands::browse::parse_filter)]
        filters: Vec<(String, String)>,

        /// Maximum number of pages to walk
        #[arg(short, long, default_value_t = 1)]
        pages: u32,

        /// Products per page
        #[arg(long, default_value_t = 24)]
        page_size: u32,
    },
    /// Show the facets offered by a collection page
    Facets {
        /// Collection handle
        handle: String,

        /// Products per page
        #[arg(long, default_value_t = 24)]
        page_size: u32,
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
        Commands::Migrate => commands::migrate::sessions().await?,
        Commands::Browse {
            handle,
            search,
            sort,
            filters,
            pages,
            page_size,
        } => {
            let target = match (handle, search) {
                (_, Some(term)) => commands::browse::Target::Search(term),
                (Some(handle), None) => commands::browse::Target::Collection(handle),
                (None, None) => return Err("a collection handle or --search is required".into()),
            };
            let options = commands::browse::BrowseOptions {
                sort: sort.as_deref().map(shopfront_core::SortKey::parse),
                filters,
                pages,
                page_size,
            };
            commands::browse::run(target, options).await?;
        }
        Commands::Facets { handle, page_size } => {
            commands::facets::run(&handle, page_size).await?;
        }
    }
    Ok(())
}
