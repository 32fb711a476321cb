mod place;
mod search;

use clap::{Parser, Subcommand};
use nearserve_core::ScopeRung;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "nearserve")]
#[command(about = "Find service providers near a location, widening the search when nothing is close")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search for providers around a position or a named place
    Search {
        /// Latitude of the search center (defaults to the configured center)
        #[arg(long, requires = "lng", allow_negative_numbers = true)]
        lat: Option<f64>,
        /// Longitude of the search center
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lng: Option<f64>,
        /// Free-text place to search around instead of a coordinate
        #[arg(long, conflicts_with_all = ["lat", "lng"])]
        place: Option<String>,
        /// Starting scope: `10km`, `radius:25`, `city`, `state` or `country`
        #[arg(long, default_value = "10km")]
        scope: ScopeRung,
        /// Service category (e.g. cooking)
        #[arg(long)]
        category: Option<String>,
        /// Only show providers whose name, category or description contains this text
        #[arg(long)]
        filter: Option<String>,
        /// Widen automatically once when the first search is empty
        #[arg(long)]
        auto_expand: bool,
        /// Keep accepting wider scopes until something is found
        #[arg(long)]
        follow_suggestions: bool,
        /// Behave as if device location access was denied
        #[arg(long, conflicts_with_all = ["lat", "lng"])]
        deny_location: bool,
    },
    /// Resolve a place name to coordinates
    Geocode {
        /// Free-text place name
        query: String,
    },
    /// Resolve coordinates to city, state and country
    Reverse {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
    },
    /// Show the scope ladder for a position
    Ladder {
        #[arg(long, requires = "lng", allow_negative_numbers = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lng: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = nearserve_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Search {
            lat,
            lng,
            place,
            scope,
            category,
            filter,
            auto_expand,
            follow_suggestions,
            deny_location,
        }) => {
            let center = search::CenterSource::from_args(lat, lng, place, deny_location)?;
            let options = search::SearchOptions {
                scope,
                category,
                filter,
                auto_expand: auto_expand || config.auto_expand,
                follow_suggestions,
            };
            search::run_search(&config, center, options).await?;
        }
        Some(Commands::Geocode { query }) => place::run_geocode(&config, &query).await?,
        Some(Commands::Reverse { lat, lng }) => place::run_reverse(&config, lat, lng).await?,
        Some(Commands::Ladder { lat, lng }) => place::run_ladder(&config, lat.zip(lng)).await?,
        None => println!("nothing to do; try `nearserve search --help`"),
    }

    Ok(())
}
