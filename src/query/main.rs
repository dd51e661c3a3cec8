//! Query server for administrative lookups.
//!
//! Builds the boundary hierarchy once at startup and serves read-only
//! point lookups over HTTP.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use adlookup::config::{Config, Overrides, ServerConfig};
use adlookup::{GeoPoint, LevelRecord, MultiLevelLocator};

#[derive(Parser, Debug)]
#[command(name = "query")]
#[command(about = "Administrative lookup server")]
struct Args {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address (overrides the config file)
    #[arg(short, long)]
    listen: Option<String>,

    /// Directory of boundary files
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Root administrative code
    #[arg(long)]
    root: Option<String>,

    /// Maximum number of levels to descend (0 = unlimited)
    #[arg(long)]
    max_levels: Option<usize>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Application state shared across handlers
struct AppState {
    locator: MultiLevelLocator,
    failures: Vec<FailureInfo>,
}

#[derive(Clone, Serialize)]
struct FailureInfo {
    adcode: String,
    parent: String,
    reason: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("adlookup Query Server");

    let overrides = Overrides {
        data_dir: args.data_dir.clone(),
        root_adcode: args.root.clone(),
        max_levels: args.max_levels,
        ..Default::default()
    };
    let (mut locator_config, server) = match &args.config {
        Some(path) => {
            let config = Config::load_from_file(path)?;
            (config.locator, config.server)
        }
        None => (overrides.resolve(None)?, ServerConfig::default()),
    };
    overrides.apply(&mut locator_config);
    let listen = args.listen.clone().unwrap_or(server.listen);

    // Construction is synchronous file I/O; keep it off the runtime threads
    let state = tokio::task::spawn_blocking(move || -> Result<AppState> {
        let build = locator_config.build_hierarchy()?;
        let (geo, failures) = build.into_parts();
        let failures: Vec<FailureInfo> = failures
            .into_iter()
            .filter(|f| !f.error.is_missing_source())
            .map(|f| FailureInfo {
                adcode: f.adcode,
                parent: f.parent,
                reason: f.error.to_string(),
            })
            .collect();
        for failure in &failures {
            warn!("{} left out: {}", failure.adcode, failure.reason);
        }
        Ok(AppState {
            locator: locator_config.locator(geo),
            failures,
        })
    })
    .await
    .context("Hierarchy build task panicked")??;

    info!(
        "Loaded {} region indexes below {}",
        state.locator.hierarchy().len(),
        state.locator.hierarchy().root()
    );

    let state = Arc::new(state);

    // Build router
    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/v1/locate", get(locate_handler))
        .route("/v1/contains", get(contains_handler))
        .route("/v1/hierarchy", get(hierarchy_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("Starting server on {}", listen);

    let listener = tokio::net::TcpListener::bind(&listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let loaded = state.locator.hierarchy().root_index().is_some();

    Json(HealthResponse {
        status: if loaded { "ok" } else { "degraded" },
        indexes: state.locator.hierarchy().len(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    indexes: usize,
}

/// Multi-level lookup
async fn locate_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PointQueryParams>,
) -> Result<Json<LocateResponse>, (StatusCode, String)> {
    let point = params.point()?;
    let levels = state.locator.lookup(&point);

    Ok(Json(LocateResponse { point, levels }))
}

/// Whether the point is inside any root-level region
async fn contains_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PointQueryParams>,
) -> Result<Json<ContainsResponse>, (StatusCode, String)> {
    let point = params.point()?;

    Ok(Json(ContainsResponse {
        contained: state.locator.contains(point.lat, point.lon),
    }))
}

/// Loaded indexes and the children that failed to build
async fn hierarchy_handler(State(state): State<Arc<AppState>>) -> Json<HierarchyResponse> {
    let geo = state.locator.hierarchy();

    Json(HierarchyResponse {
        root: geo.root().to_string(),
        max_levels: state.locator.max_levels(),
        codes: geo.codes().into_iter().map(String::from).collect(),
        failures: state.failures.clone(),
    })
}

#[derive(Deserialize)]
struct PointQueryParams {
    /// Point latitude
    lat: f64,
    /// Point longitude
    lon: f64,
}

impl PointQueryParams {
    fn point(&self) -> Result<GeoPoint, (StatusCode, String)> {
        let point = GeoPoint::new(self.lat, self.lon);
        if !point.is_valid() {
            return Err((
                StatusCode::BAD_REQUEST,
                format!("invalid coordinate ({}, {})", self.lat, self.lon),
            ));
        }
        Ok(point)
    }
}

#[derive(Serialize)]
struct LocateResponse {
    point: GeoPoint,
    levels: Vec<LevelRecord>,
}

#[derive(Serialize)]
struct ContainsResponse {
    contained: bool,
}

#[derive(Serialize)]
struct HierarchyResponse {
    root: String,
    max_levels: Option<usize>,
    codes: Vec<String>,
    failures: Vec<FailureInfo>,
}
