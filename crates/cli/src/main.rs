//! Storekeep CLI - migrations, seeding, refunds, and reports.
//!
//! # Usage
//!
//! ```bash
//! # Create the schema
//! sk-cli migrate
//!
//! # Load the bundled sample data
//! sk-cli seed
//!
//! # Refund an order whose payment matches its total
//! sk-cli refund 1
//!
//! # Customers with no order in the 30 days up to a given date
//! sk-cli report inactive-customers --as-of 2024-03-31
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Insert sample data from a YAML file
//! - `refund` - Refund an order
//! - `report` - Print one of the four store reports
//!
//! Configuration comes from the environment (see `storekeep_db::config`).
//! Logging honors `RUST_LOG` and defaults to `storekeep=info,sk_cli=info`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use storekeep_core::reports::{DEFAULT_BEST_SELLER_LIMIT, DEFAULT_INACTIVE_DAYS};

mod commands;

#[derive(Parser)]
#[command(name = "sk-cli")]
#[command(author, version, about = "Storekeep CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Insert sample customers, products, orders, payments, and reviews
    Seed {
        /// Seed file (YAML)
        #[arg(short, long, default_value = commands::seed::DEFAULT_SEED_FILE)]
        file: String,
    },
    /// Refund an order whose payment matches its total
    Refund {
        /// Order to refund
        order_id: i32,
    },
    /// Print a report
    Report {
        #[command(subcommand)]
        report: ReportKind,
    },
}

#[derive(Subcommand)]
enum ReportKind {
    /// Each order with its customer, recorded total, and line-item sum
    OrderTotals,
    /// Customers with no order in a trailing window
    InactiveCustomers {
        /// Last day of the window (default: today, UTC)
        #[arg(long)]
        as_of: Option<NaiveDate>,

        /// Window length in days
        #[arg(long, default_value_t = DEFAULT_INACTIVE_DAYS)]
        days: u32,
    },
    /// Products ranked by units sold
    BestSellers {
        /// Number of rows to show
        #[arg(short, long, default_value_t = DEFAULT_BEST_SELLER_LIMIT)]
        limit: i64,
    },
    /// Average review rating per product
    AverageRatings,
}

/// Log filter used when `RUST_LOG` is unset: the library crates and this binary.
const DEFAULT_LOG_FILTER: &str = "storekeep=info,sk_cli=info";

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

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
        Commands::Seed { file } => commands::seed::run(&file).await?,
        Commands::Refund { order_id } => commands::refund::run(order_id).await?,
        Commands::Report { report } => match report {
            ReportKind::OrderTotals => commands::report::order_totals().await?,
            ReportKind::InactiveCustomers { as_of, days } => {
                let as_of = as_of.unwrap_or_else(|| chrono::Utc::now().date_naive());
                commands::report::inactive_customers(as_of, days).await?;
            }
            ReportKind::BestSellers { limit } => commands::report::best_sellers(limit).await?,
            ReportKind::AverageRatings => commands::report::average_ratings().await?,
        },
    }
    Ok(())
}
