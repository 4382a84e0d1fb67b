use std::{
    fs::OpenOptions,
    net::SocketAddr,
    path::{Path, PathBuf},
    process::exit,
    sync::Arc,
    time::Duration,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use rand::{SeedableRng, rngs::StdRng};
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use tracing_subscriber::{EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use sales_dashboard::{
    AppState, DEFAULT_REFRESH_DELAY, DEFAULT_TICK_INTERVAL, DEFAULT_TRANSACTION_LOG_CAPACITY,
    DashboardConfig, JsonSeedFile, SampleSeed, SeedSource, build_router, graceful_shutdown,
    logging_middleware,
};

/// The web server for the sales dashboard.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The port to serve the dashboard from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// File path to a JSON file with the dashboard data. The built-in sample
    /// data is used if this is not set.
    #[arg(long)]
    seed_path: Option<PathBuf>,

    /// How often a simulated transaction is added, in milliseconds. Must be
    /// at least 1.
    #[arg(
        long,
        default_value_t = DEFAULT_TICK_INTERVAL.as_millis() as u64,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    tick_interval_ms: u64,

    /// How long the refresh button stays disabled after a refresh, in milliseconds.
    #[arg(long, default_value_t = DEFAULT_REFRESH_DELAY.as_millis() as u64)]
    refresh_delay_ms: u64,

    /// Seed for the random number generator, for reproducible simulations.
    #[arg(long)]
    rng_seed: Option<u64>,

    /// File path to write debug logs to.
    #[arg(long, default_value = "debug.log")]
    log_path: PathBuf,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    setup_logging(&args.log_path);

    let seed: Box<dyn SeedSource> = match &args.seed_path {
        Some(path) => Box::new(JsonSeedFile::new(path)),
        None => Box::new(SampleSeed),
    };

    let snapshot = match seed.load() {
        Ok(snapshot) => snapshot,
        Err(error) => {
            tracing::error!("Could not load the dashboard data: {error}");
            exit(1);
        }
    };

    let config = DashboardConfig {
        tick_interval: Duration::from_millis(args.tick_interval_ms),
        refresh_delay: Duration::from_millis(args.refresh_delay_ms),
        transaction_log_capacity: DEFAULT_TRANSACTION_LOG_CAPACITY,
    };

    let rng = match args.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let state = AppState::new(snapshot, config, rng);

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = build_router(state.clone()).layer(middleware::from_fn(logging_middleware));
    let router = add_tracing_layer(router);

    #[cfg(debug_assertions)]
    let router = router.layer(LiveReloadLayer::new());

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));
    tracing::info!("HTTP server listening on {}", addr);

    if let Err(error) = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    {
        tracing::error!("Server error: {error}");
    }

    state.shutdown();
}

fn setup_logging(log_path: &Path) {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = match OpenOptions::new().create(true).append(true).open(log_path) {
        Ok(file) => file,
        Err(error) => {
            eprintln!("Could not create log file {}: {error}", log_path.display());
            exit(1);
        }
    };

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log),
        )
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}
