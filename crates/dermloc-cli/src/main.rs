mod charts;
mod font;
mod search;

use clap::{Parser, Subcommand};
use dermloc_core::{Category, OwnershipFilter};
use tracing_subscriber::EnvFilter;

use crate::charts::run_charts;
use crate::font::{run_font, FontCommands};
use crate::search::{run_geocode, run_search, SearchArgs};

#[derive(Debug, Parser)]
#[command(name = "dermloc-cli")]
#[command(about = "Find nearby dermatology care and browse incidence charts")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search for facilities around a location
    Search {
        /// Latitude of the search origin
        #[arg(long, allow_hyphen_values = true, requires = "lon")]
        lat: Option<f64>,
        /// Longitude of the search origin
        #[arg(long, allow_hyphen_values = true, requires = "lat")]
        lon: Option<f64>,
        /// Free-text address to geocode instead of --lat/--lon
        #[arg(long, conflicts_with_all = ["lat", "lon"])]
        address: Option<String>,
        /// Search radius in kilometers
        #[arg(long, default_value = "5")]
        radius_km: f64,
        /// hospital, clinic, dermatology (or derm), all
        #[arg(long, default_value = "dermatology")]
        category: Category,
        /// all, public, private
        #[arg(long, default_value = "all")]
        ownership: OwnershipFilter,
        /// Print the rendered view as JSON
        #[arg(long)]
        json: bool,
    },
    /// Resolve an address to coordinates
    Geocode {
        /// Address or city
        query: String,
    },
    /// Accessibility font size preference
    Font {
        #[command(subcommand)]
        command: FontCommands,
    },
    /// Load the incidence, forecast and UV correlation charts
    Charts {
        #[arg(long)]
        start: Option<i32>,
        #[arg(long)]
        end: Option<i32>,
        /// Forecast model to try first (ARIMA or ETS)
        #[arg(long)]
        model: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = dermloc_core::load_app_config()?;

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
            lon,
            address,
            radius_km,
            category,
            ownership,
            json,
        }) => {
            let args = SearchArgs {
                origin: lat.zip(lon),
                address,
                radius_km,
                category,
                ownership,
                json,
            };
            run_search(&config, &args).await?;
        }
        Some(Commands::Geocode { query }) => run_geocode(&config, &query).await?,
        Some(Commands::Font { command }) => run_font(&config, &command)?,
        Some(Commands::Charts { start, end, model }) => {
            run_charts(&config, start, end, model.as_deref()).await?;
        }
        None => println!("dermloc-cli ready; see --help"),
    }

    Ok(())
}
