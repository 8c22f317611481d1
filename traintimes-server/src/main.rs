use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use traintimes_server::cache::CachedFeed;
use traintimes_server::config::{ServerConfig, SourceConfig};
use traintimes_server::feed::{
    ArrivalTable, Backend, FetchCoordinator, FileArrivalSource, PgArrivalSource, PgSourceConfig,
};
use traintimes_server::stations::StationCatalog;
use traintimes_server::web::{AppState, create_router};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "server failed");
            ExitCode::FAILURE
        }
    }
}

/// Build both arrival sources from configuration.
async fn backends(source: &SourceConfig) -> Result<(Backend, Backend), Box<dyn Error>> {
    match source {
        SourceConfig::File { path, .. } => {
            let file = FileArrivalSource::load(path)?;
            info!(path = %path.display(), rows = file.len().await, "serving arrivals from file");
            Ok((Backend::File(file.clone()), Backend::File(file)))
        }
        SourceConfig::Postgres {
            primary_url,
            secondary_url,
        } => {
            let pool_config = PgSourceConfig::default();
            let primary =
                PgArrivalSource::connect_lazy(primary_url, ArrivalTable::Primary, &pool_config)?;
            let secondary = match secondary_url {
                Some(url) => {
                    PgArrivalSource::connect_lazy(url, ArrivalTable::Secondary, &pool_config)?
                }
                None => PgArrivalSource::with_pool(primary.pool().clone(), ArrivalTable::Secondary),
            };
            info!(
                separate_secondary = secondary_url.is_some(),
                "serving arrivals from postgres"
            );
            Ok((Backend::Postgres(primary), Backend::Postgres(secondary)))
        }
    }
}

async fn run() -> Result<(), Box<dyn Error>> {
    let config = ServerConfig::from_env()?;

    let catalog = StationCatalog::load(&config.stations_path)?;
    info!(stations = catalog.len(), path = %config.stations_path.display(), "loaded stations");

    let (primary, secondary) = backends(&config.source).await?;
    let file_source = match &primary {
        Backend::File(file) => Some(file.clone()),
        Backend::Postgres(_) => None,
    };
    let coordinator = FetchCoordinator::new(primary, secondary, config.fetch.clone());
    let feed = CachedFeed::new(coordinator, &config.cache);
    let state = AppState::new(feed, catalog);

    // Pick up edits to the arrivals file, dropping answers cached from the old rows
    if let (Some(file), SourceConfig::File { reload_every, .. }) = (file_source, &config.source) {
        let feed = Arc::clone(&state.feed);
        file.spawn_reloader(*reload_every, move |_| feed.invalidate_cache());
    }

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "arrival board listening");
    info!("  GET  /health");
    info!("  POST /api                  - station board");
    info!("  POST /api/futureStops      - later stops of a trip");
    info!("  GET  /api/stations/nearby  - stations near a point");
    info!("  GET  /api/families         - line families");

    axum::serve(listener, app).await?;
    Ok(())
}
