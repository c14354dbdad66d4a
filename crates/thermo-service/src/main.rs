//! Thermo Service - hourly temperature aggregation over HTTP.
//!
//! Run with: `cargo run -p thermo-service`

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::bail;
use axum::Router;
use clap::{Parser, Subcommand};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use thermo_service::{AppState, Config, api};
use thermo_store::{Store, fixtures};
use thermo_types::{Clock, SystemClock};

/// Thermo Service - hourly min/max temperature aggregation.
#[derive(Parser, Debug)]
#[command(name = "thermo-service")]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Bind address (overrides config).
    #[arg(short, long, global = true)]
    bind: Option<String>,

    /// Database path (overrides config).
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the service in the foreground (default behavior).
    Run,

    /// Fill the database with simulated hourly buckets.
    Seed {
        /// Number of days of history to generate.
        #[arg(
            long,
            default_value_t = 7,
            value_parser = clap::value_parser!(u32).range(1..=i64::from(fixtures::MAX_SEED_DAYS)),
        )]
        days: u32,

        /// Seed even if the database already holds buckets.
        #[arg(long)]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    // The local offset can only be read while the process is single-threaded
    let clock = SystemClock::local();

    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("thermo_service=info".parse()?)
                .add_directive("thermo_store=info".parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .init();

    info!("Using local offset {}", clock.offset());
    let config = load_config(&args)?;

    match args.command {
        Some(Command::Seed { days, force }) => seed_database(&config, &clock, days, force),
        Some(Command::Run) | None => tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?
            .block_on(run_server(config, clock)),
    }
}

fn load_config(args: &Args) -> anyhow::Result<Config> {
    // Load configuration
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default().unwrap_or_else(|e| {
            warn!("Ignoring unreadable default config: {}", e);
            Config::default()
        }),
    };

    // Override config with CLI args
    if let Some(bind) = &args.bind {
        config.server.bind = bind.clone();
    }
    if let Some(db_path) = &args.database {
        config.storage.path = db_path.clone();
    }

    config.validate()?;
    Ok(config)
}

fn seed_database(config: &Config, clock: &SystemClock, days: u32, force: bool) -> anyhow::Result<()> {
    let store = Store::open(&config.storage.path)?;

    let existing = store.count_buckets()?;
    if existing > 0 && !force {
        bail!(
            "database already holds {} buckets; pass --force to seed anyway",
            existing
        );
    }

    let buckets =
        fixtures::simulate_hourly(clock.now(), days * 24, config.readings, &mut rand::rng());
    let written = fixtures::seed(&store, &buckets)?;

    println!("Seeded {} hourly buckets", written);
    Ok(())
}

async fn run_server(config: Config, clock: SystemClock) -> anyhow::Result<()> {
    // Open the database
    let store = Store::open(&config.storage.path)?;

    // Create application state
    let state = AppState::with_clock(store, config.clone(), Arc::new(clock));

    // Build the router
    let app = Router::new()
        .merge(api::router())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    info!("Starting server on {}", config.server.bind);

    // Run the server
    let listener = tokio::net::TcpListener::bind(config.server.bind.as_str()).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
