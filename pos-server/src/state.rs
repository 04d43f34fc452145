//! Application state shared by every handler

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::auth::{JwtService, RateLimiter};
use crate::config::Config;
use crate::error::BoxError;
use crate::services::product::{IMAGE_QUEUE_CAPACITY, ImageJob};
use crate::services::report_worker::ReportSignal;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    /// Access token issuing / validation
    pub jwt: Arc<JwtService>,
    /// Rate limiter for login/registration routes
    pub rate_limiter: RateLimiter,
    /// Wakes the report worker after a payment
    pub report_signal: ReportSignal,
    /// Queue of product images waiting to be written
    pub image_jobs: mpsc::Sender<ImageJob>,
}

/// Receiving ends of the state's channels, handed to the background workers
pub struct WorkerChannels {
    pub report_rx: mpsc::Receiver<()>,
    pub image_rx: mpsc::Receiver<ImageJob>,
}

impl AppState {
    /// Connect, migrate and wire the channels
    pub async fn new(config: &Config) -> Result<(Self, WorkerChannels), BoxError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");

        Ok(Self::with_pool(pool, config))
    }

    pub fn with_pool(pool: PgPool, config: &Config) -> (Self, WorkerChannels) {
        let (report_signal, report_rx) = ReportSignal::channel();
        let (image_jobs, image_rx) = mpsc::channel(IMAGE_QUEUE_CAPACITY);

        let state = Self {
            pool,
            jwt: Arc::new(JwtService::new(&config.jwt_secret, config.jwt_expiry_hours)),
            rate_limiter: RateLimiter::new(),
            report_signal,
            image_jobs,
        };
        (
            state,
            WorkerChannels {
                report_rx,
                image_rx,
            },
        )
    }
}
