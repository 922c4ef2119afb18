mod catalog;
mod search;
mod watch;

use clap::{Parser, Subcommand};
use stonemart_search::debounce::DEFAULT_DELAY_MS;
use stonemart_search::SortKey;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

use crate::catalog::CatalogArgs;

#[derive(Debug, Parser)]
#[command(name = "stonemart-cli")]
#[command(about = "Query a memorial listing catalog from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Filter and sort the catalog with a storefront query string
    Search {
        /// Query string as it appears in a listing URL, e.g. `material=Granite&location=GP`
        query: Option<String>,
        #[command(flatten)]
        catalog: CatalogArgs,
        /// Free-text search applied on top of the query
        #[arg(long)]
        text: Option<String>,
        /// Sort order: price, listing-date, or alphabetical
        #[arg(long)]
        sort: Option<SortKey>,
        /// Maximum number of listings to print
        #[arg(long, default_value = "20")]
        limit: usize,
        /// Print the full result as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show option counts for every counted facet
    Facets {
        /// Query string the counts are computed against
        query: Option<String>,
        #[command(flatten)]
        catalog: CatalogArgs,
        #[arg(long)]
        json: bool,
    },
    /// Print the province/city/town tree with listing counts
    Locations {
        #[command(flatten)]
        catalog: CatalogArgs,
        #[arg(long)]
        json: bool,
    },
    /// Read search text from stdin line by line and print settled results
    Watch {
        /// Query string the free text is combined with
        query: Option<String>,
        #[command(flatten)]
        catalog: CatalogArgs,
        /// Quiet period before typed text is applied
        #[arg(long, env = "STONEMART_SEARCH_DEBOUNCE_MS", default_value_t = DEFAULT_DELAY_MS)]
        debounce_ms: u64,
        /// Maximum number of listings to print per settled result
        #[arg(long, default_value = "10")]
        limit: usize,
    },
}

/// `RUST_LOG` wins, then `STONEMART_LOG_LEVEL`, then `warn`.
fn log_filter<F>(lookup: F) -> Result<EnvFilter, ParseError>
where
    F: Fn(&str) -> Option<String>,
{
    let directives = lookup("RUST_LOG")
        .or_else(|| lookup("STONEMART_LOG_LEVEL"))
        .unwrap_or_else(|| "warn".to_string());
    EnvFilter::try_new(directives)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter = log_filter(|var| std::env::var(var).ok())?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Search {
            query,
            catalog,
            text,
            sort,
            limit,
            json,
        }) => {
            let engine = catalog.load()?;
            search::run_search(
                &engine,
                query.as_deref().unwrap_or_default(),
                text.as_deref(),
                sort,
                limit,
                json,
            )?;
        }
        Some(Commands::Facets {
            query,
            catalog,
            json,
        }) => {
            let engine = catalog.load()?;
            search::run_facets(&engine, query.as_deref().unwrap_or_default(), json)?;
        }
        Some(Commands::Locations { catalog, json }) => {
            let engine = catalog.load()?;
            search::run_locations(&engine, json)?;
        }
        Some(Commands::Watch {
            query,
            catalog,
            debounce_ms,
            limit,
        }) => {
            let engine = catalog.load()?;
            watch::run_watch(
                engine,
                query.as_deref().unwrap_or_default(),
                std::time::Duration::from_millis(debounce_ms),
                limit,
            )
            .await?;
        }
        None => println!("stonemart-cli: run with --help to list commands"),
    }

    Ok(())
}
