//! agrec-server - Recommendation data-refresh and serving service
//!
//! Keeps four relational extracts (interactions, customers, products,
//! product categories) synchronized from the shop database into a local
//! denormalized feature table, and serves ranked recommendations over HTTP
//! with a staleness-gated refresh in front of the query.

use std::path::PathBuf;
use std::sync::Arc;

use agrec_common::config::{load_toml_config, resolve_data_root, DataRootInitializer};
use agrec_server::artifacts::ArtifactStore;
use agrec_server::engine::InteractionWeightRecommender;
use agrec_server::pipeline::RefreshPipeline;
use agrec_server::store::SqliteSourceStore;
use agrec_server::{build_router, AppState};
use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Default serving port, matching the service this replaced
const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Parser)]
#[command(name = "agrec-server", version, about = "Recommendation refresh and serving service")]
struct Args {
    /// Data root holding the pipeline artifacts
    #[arg(long)]
    data_root: Option<String>,

    /// Path to the shop database (read-only)
    #[arg(long, env = "AGREC_SOURCE_DB")]
    source_db: Option<String>,

    /// Port to listen on
    #[arg(long, env = "AGREC_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting AGREC recommendation server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let toml_config = load_toml_config();

    // Data root: CLI > env > TOML > OS default
    let data_root = resolve_data_root(args.data_root.as_deref(), "AGREC_DATA_ROOT");
    let initializer = DataRootInitializer::new(data_root.clone());
    initializer.ensure_directory_exists()?;
    info!("Data root: {}", data_root.display());

    // Source database: CLI/env > TOML > <data root>/shop.db
    let source_db = args
        .source_db
        .or(toml_config.source_db)
        .map(PathBuf::from)
        .unwrap_or_else(|| data_root.join("shop.db"));
    info!("Source database: {}", source_db.display());

    let pool = SqliteSourceStore::connect_readonly(&source_db).await?;
    info!("✓ Connected to source database (read-only)");

    let store = Arc::new(SqliteSourceStore::new(pool));
    let artifacts = ArtifactStore::new(data_root);
    let pipeline = Arc::new(RefreshPipeline::new(store.clone(), artifacts.clone()));
    let engine = Arc::new(InteractionWeightRecommender::new(artifacts));

    let state = AppState::new(store, pipeline, engine);
    let app = build_router(state);

    let port = args.port.or(toml_config.port).unwrap_or(DEFAULT_PORT);
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    info!("agrec-server listening on http://127.0.0.1:{port}");
    info!("Health check: http://127.0.0.1:{port}/health");

    axum::serve(listener, app).await?;

    Ok(())
}
