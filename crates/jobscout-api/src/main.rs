//! jobscout-api - HTTP trigger surface for the jobscout pipeline.
//!
//! Wires the stores, source drivers, and refresh pipeline together, starts
//! the interval scheduler, and exposes `POST /api/refresh` for external
//! schedulers to hit.

mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jobscout_core::ScrapeConfig;
use jobscout_db::Database;
use jobscout_jobs::{PassthroughScorer, RefreshPipeline, RefreshScheduler, SchedulerConfig};
use jobscout_scrape::{BrowserBoardDriver, HttpBoardDriver, RemoteOkDriver, SourceDriver};

use handlers::AppState;

const DEFAULT_BOARD_URL: &str = "https://www.indeed.com/jobs";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "jobscout_api=info,jobscout_jobs=info,jobscout_scrape=info,jobscout_db=info".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://localhost/jobscout".to_string());
    let db = Database::connect(&database_url).await?;
    db.migrate().await?;

    let config = Arc::new(ScrapeConfig::from_env());
    let pipeline = Arc::new(build_pipeline(&db, config)?);

    let scheduler = RefreshScheduler::new(pipeline.clone(), SchedulerConfig::from_env());
    let _scheduler_handle = scheduler.start();

    let app = Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/api/refresh", post(handlers::refresh))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(AppState { pipeline });

    let addr: SocketAddr = std::env::var("JOBSCOUT_LISTEN")
        .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
        .parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "jobscout API listening");
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_pipeline(db: &Database, config: Arc<ScrapeConfig>) -> anyhow::Result<RefreshPipeline> {
    let mut pipeline = RefreshPipeline::new(
        db.jobs.clone(),
        db.runs.clone(),
        db.profiles.clone(),
        Arc::new(PassthroughScorer),
        config.clone(),
    );

    pipeline.add_driver(Arc::new(RemoteOkDriver::new(config.clone())));

    let board_url =
        std::env::var("JOBSCOUT_BOARD_URL").unwrap_or_else(|_| DEFAULT_BOARD_URL.to_string());
    pipeline.add_driver(Arc::new(HttpBoardDriver::new(
        "board",
        &board_url,
        config.clone(),
    )?));

    let browser_enabled = std::env::var("JOBSCOUT_BROWSER_ENABLED")
        .map(|v| v != "false" && v != "0")
        .unwrap_or(true);
    if browser_enabled {
        let driver = Arc::new(BrowserBoardDriver::new("browser-board", &board_url, config)?);
        if !driver.is_enabled() {
            warn!("Browser board driver constructed in disabled state");
        }
        pipeline.add_driver(driver);
    }

    Ok(pipeline)
}
