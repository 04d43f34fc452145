use std::sync::Arc;
use std::time::Duration;

use pos_server::config::Config;
use pos_server::error::BoxError;
use pos_server::services::product::ImageUploadWorker;
use pos_server::services::report_worker::{PgReportStore, ReportWorker, RetryPolicy};
use pos_server::state::AppState;
use pos_server::storage::LocalUploader;
use pos_server::tasks::{BackgroundTasks, TaskKind};
use pos_server::{api, db};

/// Rate limiter and refresh token housekeeping interval
const CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pos_server=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;
    tracing::info!("Starting pos-server (env: {})", config.environment);
    if config.is_development() {
        tracing::warn!("Development mode: unset secrets fall back to placeholder values");
    }

    let (state, channels) = AppState::new(&config).await?;

    let mut tasks = BackgroundTasks::new();

    let report_worker = ReportWorker::new(
        PgReportStore::new(state.pool.clone()),
        RetryPolicy::new(config.report_max_attempts),
    );
    tasks.spawn(
        "report_worker",
        TaskKind::Worker,
        report_worker.run(channels.report_rx, tasks.shutdown_token()),
    );

    let uploader = Arc::new(LocalUploader::new(
        &config.upload_dir,
        &config.public_url_prefix,
    ));
    let image_worker = ImageUploadWorker::new(state.pool.clone(), uploader);
    tasks.spawn(
        "image_upload_worker",
        TaskKind::Worker,
        image_worker.run(channels.image_rx, tasks.shutdown_token()),
    );

    let rate_limiter = state.rate_limiter.clone();
    tasks.spawn_periodic("rate_limit_cleanup", CLEANUP_INTERVAL, move || {
        let rate_limiter = rate_limiter.clone();
        async move { rate_limiter.cleanup().await }
    });

    let pool = state.pool.clone();
    tasks.spawn_periodic("refresh_token_cleanup", CLEANUP_INTERVAL, move || {
        let pool = pool.clone();
        async move {
            match db::refresh_tokens::delete_expired(&pool).await {
                Ok(0) => {}
                Ok(n) => tracing::info!(removed = n, "Expired refresh tokens removed"),
                Err(e) => tracing::warn!(error = %e, "Refresh token cleanup failed"),
            }
        }
    });

    tasks.log_summary();

    let app = api::create_router(state, &config);
    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("pos-server HTTP listening on {addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("HTTP server stopped, draining background work");
    tasks.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
