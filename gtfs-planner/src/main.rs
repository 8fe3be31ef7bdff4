use std::error::Error;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use gtfs_planner::config::ServerConfig;
use gtfs_planner::engine::RoutingEngine;
use gtfs_planner::planner::{CommaNameFilter, RoutingPolicy};
use gtfs_planner::web::{AppState, create_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = ServerConfig::from_env()?;

    let engine = RoutingEngine::new(
        RoutingPolicy::default(),
        std::sync::Arc::new(CommaNameFilter),
        &config.cache,
    );

    // Fail fast if the initial snapshot is unusable
    info!(path = %config.dataset.display(), "Loading timetable");
    engine.publish_file(&config.dataset).await?;

    if let Some(period) = config.reload {
        let engine = engine.clone();
        let path = config.dataset.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.tick().await; // First tick is immediate, skip it
            loop {
                interval.tick().await;
                if let Err(e) = engine.publish_file(&path).await {
                    error!(error = %e, "Timetable reload failed");
                }
            }
        });
    }

    let app = create_router(AppState::new(engine));

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!(addr = %config.addr, "GTFS journey planner listening");
    info!("  GET  /health          - Health check");
    info!("  GET  /api/stations    - Served stations");
    info!("  GET  /api/timetable   - Timetable coverage");
    info!("  GET  /api/departures  - Departure board");
    info!("  GET  /journey/plan    - Plan a journey");

    axum::serve(listener, app).await?;
    Ok(())
}
