//! Agricultural ML API gateway.
//! Crop, fertilizer, disease and yield prediction over HTTP forms; JSON out.

mod error;
mod form;
mod handlers;
mod state;

use agri_core::config::LOG_FILE_NAME;
use agri_core::ServerConfig;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use state::AppState;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = ServerConfig::load()?;
    let _log_guard = init_tracing(&config)?;

    tracing::info!(
        debug = config.debug,
        log_file = %config.paths.log_file().display(),
        "Loading models and reference data"
    );
    let state = AppState::load(&config.paths);
    let app = router(state, config.max_upload_bytes);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Agricultural ML API listening");

    axum::serve(listener, app).await?;
    Ok(())
}

fn router(state: AppState, max_upload_bytes: usize) -> Router {
    use handlers::{predict, system};

    Router::new()
        .route("/", get(system::home))
        .route("/health", get(system::health))
        .route("/predict-crop", post(predict::predict_crop))
        .route("/predict-fertilizer", post(predict::predict_fertilizer))
        .route("/predict-disease", post(predict::predict_disease))
        .route("/predict-yield", post(predict::predict_yield))
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Stdout plus `<logs_dir>/api.log`. The guard must live until shutdown so
/// buffered file lines are flushed.
fn init_tracing(config: &ServerConfig) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(&config.paths.logs_dir)?;
    let file = tracing_appender::rolling::never(&config.paths.logs_dir, LOG_FILE_NAME);
    let (file_writer, guard) = tracing_appender::non_blocking(file);

    let filter = EnvFilter::try_new(filter_directive(&config.logging_level))
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .init();
    Ok(guard)
}

/// Accept Python-style level names (`WARNING`, `CRITICAL`) alongside
/// ordinary `EnvFilter` directives.
fn filter_directive(level: &str) -> String {
    match level.trim().to_ascii_uppercase().as_str() {
        "WARNING" => "warn".to_string(),
        "CRITICAL" | "FATAL" => "error".to_string(),
        "DEBUG" | "INFO" | "WARN" | "ERROR" | "TRACE" => level.trim().to_ascii_lowercase(),
        _ => level.trim().to_string(),
    }
}
