//! GeoProxy CLI
//!
//! Runs the caching geocoding proxy, or performs one-off lookups through the
//! same cache-aside pipeline.

use std::net::SocketAddr;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use geoproxy_api::{ApiServer, AppConfig, AppState, CacheBackend};
use geoproxy_core::error::GeoError;
use geoproxy_core::traits::AddressLookup;
use geoproxy_core::types::{LookupRequest, LookupResult};

/// GeoProxy - caching proxy for address suggestions and reverse geocoding
#[derive(Parser)]
#[command(name = "geoproxy")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(flatten)]
    overrides: ConfigOverrides,

    #[command(subcommand)]
    command: Commands,
}

/// Flags that take precedence over the environment.
#[derive(Args)]
struct ConfigOverrides {
    /// DaData API key
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Cache store: redis or memory
    #[arg(long, global = true)]
    cache_backend: Option<CacheBackend>,

    /// Redis connection URL
    #[arg(long, global = true)]
    redis_url: Option<String>,

    /// Lifetime of cached results in seconds
    #[arg(long, global = true)]
    cache_ttl: Option<u64>,
}

impl ConfigOverrides {
    fn apply(self, config: &mut AppConfig) {
        if let Some(key) = self.api_key {
            config.upstream.api_key = key;
        }
        if let Some(backend) = self.cache_backend {
            config.cache_backend = backend;
        }
        if let Some(url) = self.redis_url {
            config.redis.url = url;
        }
        if let Some(ttl) = self.cache_ttl {
            config.cache_ttl_seconds = ttl;
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
        /// Bind address
        #[arg(short, long, default_value = "0.0.0.0")]
        bind: String,
    },

    /// Look up addresses matching free-form text
    Search {
        /// Address text, e.g. "Moscow, Tverskaya 1"
        query: String,
        /// Print the raw JSON response
        #[arg(long)]
        json: bool,
    },

    /// Find addresses near a coordinate pair
    Geocode {
        /// Latitude, e.g. 55.76
        #[arg(allow_hyphen_values = true)]
        lat: String,
        /// Longitude, e.g. 37.60
        #[arg(allow_hyphen_values = true)]
        lng: String,
        /// Print the raw JSON response
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "geoproxy=debug,tower_http=debug,info"
    } else {
        "geoproxy=info,warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(cli.json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!cli.json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    let mut config = AppConfig::from_env().context("Invalid configuration")?;
    cli.overrides.apply(&mut config);

    match cli.command {
        Commands::Serve { port, bind } => cmd_serve(config, port, &bind).await,
        Commands::Search { query, json } => {
            cmd_lookup(config, LookupRequest::text(query), json).await
        }
        Commands::Geocode { lat, lng, json } => {
            cmd_lookup(config, LookupRequest::coordinates(lat, lng), json).await
        }
    }
}

/// Run the API server
async fn cmd_serve(config: AppConfig, port: u16, bind: &str) -> Result<()> {
    println!("{}", "🚀 Starting GeoProxy API server...".cyan().bold());
    println!("   {} http://{}:{}", "Listening on:".green(), bind, port);
    println!("   {} {}", "Cache backend:".dimmed(), config.cache_backend);
    println!("   {} {}s", "Cache TTL:".dimmed(), config.cache_ttl_seconds);
    println!("\n   Press Ctrl+C to stop.\n");

    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .context("Invalid bind address")?;

    let server = ApiServer::build(config)
        .await
        .context("Failed to start lookup pipeline")?;
    server.run(addr).await?;

    Ok(())
}

/// One-off lookup through the cache-aside pipeline
async fn cmd_lookup(config: AppConfig, request: LookupRequest, json: bool) -> Result<()> {
    request.validate().context("Invalid lookup")?;
    if !json {
        println!("{} {}", "🔍 Looking up:".cyan().bold(), request);
    }

    let state = AppState::build(config)
        .await
        .context("Failed to start lookup pipeline")?;

    let start = Instant::now();
    match state.lookup.lookup(&request).await {
        Ok(result) if json => {
            println!("{}", serde_json::to_string_pretty(&serde_json::json!({
                "addresses": result.records(),
            }))?);
            Ok(())
        }
        Ok(result) => {
            print_result(&result, start);
            Ok(())
        }
        Err(GeoError::NoResults) => {
            println!("\n{}", "No addresses found.".yellow());
            Ok(())
        }
        Err(e) => Err(anyhow::Error::new(e).context("Lookup failed")),
    }
}

fn print_result(result: &LookupResult, start: Instant) {
    println!(
        "\n{} {} in {:?}",
        "✅ Found".green().bold(),
        result.count(),
        start.elapsed()
    );

    for (i, record) in result.records().iter().enumerate() {
        println!(
            "\n   {} {}, {}, {}",
            format!("{}.", i + 1).bold(),
            record.street,
            record.city,
            record.country
        );
        println!(
            "      {} {}, {}",
            "lat/lng:".dimmed(),
            record.latitude,
            record.longitude
        );
    }
}
