use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use schoolfinder::config::{Config, LoggingConfig};

use commands::ServeParams;

#[derive(Parser)]
#[command(
    name = "schoolfinder",
    version,
    about = "Find nearby schools by distance and register new ones",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json), overriding the configured format
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve {
        /// Host address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// JSON file of schools to start with
        #[arg(long)]
        seed_file: Option<PathBuf>,

        /// Start with an empty registry instead of the demo schools
        #[arg(long, default_value = "false")]
        no_demo_data: bool,

        /// Artificial delay before listing or adding schools
        #[arg(long)]
        latency_ms: Option<u64>,

        /// Seed for the geocoder fallback jitter
        #[arg(long)]
        geocode_seed: Option<u64>,
    },

    /// Resolve a place name to coordinates
    Geocode {
        /// Free-text place name
        text: String,

        /// Seed for the fallback jitter
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Great-circle distance between two points in kilometres
    Distance {
        #[arg(allow_negative_numbers = true)]
        lat1: f64,
        #[arg(allow_negative_numbers = true)]
        lon1: f64,
        #[arg(allow_negative_numbers = true)]
        lat2: f64,
        #[arg(allow_negative_numbers = true)]
        lon2: f64,
    },

    /// Rank schools by distance from a point
    Rank {
        #[arg(allow_negative_numbers = true)]
        latitude: f64,
        #[arg(allow_negative_numbers = true)]
        longitude: f64,

        /// JSON file of schools (defaults to the demo schools)
        #[arg(long)]
        seed_file: Option<PathBuf>,

        /// Show at most this many schools
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.command {
        Commands::Serve {
            config: Some(path),
            ..
        } => Config::from_file(path)?,
        _ => Config::from_env()?,
    };

    let mut logging = config.logging.clone();
    if let Some(format) = &cli.log_format {
        logging.format = format.clone();
    }
    setup_tracing(&logging, cli.verbose)?;

    match cli.command {
        Commands::Serve {
            host,
            port,
            config: _,
            seed_file,
            no_demo_data,
            latency_ms,
            geocode_seed,
        } => {
            tracing::info!(
                host = ?host,
                port = ?port,
                seed_file = ?seed_file,
                "Starting serve command"
            );
            commands::serve(
                config,
                ServeParams {
                    host,
                    port,
                    seed_file,
                    no_demo_data,
                    latency_ms,
                    geocode_seed,
                },
            )
            .await?;
        }

        Commands::Geocode { text, seed } => {
            tracing::debug!(text = %text, seed = ?seed, "Starting geocode command");
            commands::geocode(&text, seed)?;
        }

        Commands::Distance {
            lat1,
            lon1,
            lat2,
            lon2,
        } => {
            commands::distance(lat1, lon1, lat2, lon2)?;
        }

        Commands::Rank {
            latitude,
            longitude,
            seed_file,
            limit,
        } => {
            tracing::debug!(latitude, longitude, seed_file = ?seed_file, "Starting rank command");
            commands::rank(latitude, longitude, seed_file, limit).await?;
        }
    }

    Ok(())
}

fn setup_tracing(logging: &LoggingConfig, verbose: bool) -> Result<()> {
    logging.validate()?;
    let env_filter = logging.env_filter(verbose)?;

    match logging.format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        "text" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        other => anyhow::bail!("Unknown log format: {other} (expected text or json)"),
    }

    Ok(())
}
