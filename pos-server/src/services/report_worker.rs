//! Background recomputation of the transaction report
//!
//! Payments only *signal* the worker. The channel holds at most one pending
//! signal, so any number of payments made while a recomputation runs collapse
//! into a single follow-up run.

use async_trait::async_trait;
use sqlx::PgPool;
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_util::sync::CancellationToken;

use crate::error::is_retryable;

/// Something that can rebuild the report row in one unit of work
#[async_trait]
pub trait ReportStore: Send + Sync + 'static {
    /// `Ok(false)` when there is no report row to update
    async fn recompute(&self) -> Result<bool, sqlx::Error>;
}

/// PostgreSQL-backed store
pub struct PgReportStore {
    pool: PgPool,
}

impl PgReportStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportStore for PgReportStore {
    async fn recompute(&self) -> Result<bool, sqlx::Error> {
        super::report::recompute_transaction_report(&self.pool).await
    }
}

/// Sender half handed to request handlers
#[derive(Debug, Clone)]
pub struct ReportSignal {
    tx: mpsc::Sender<()>,
}

impl ReportSignal {
    pub fn channel() -> (Self, mpsc::Receiver<()>) {
        let (tx, rx) = mpsc::channel(1);
        (Self { tx }, rx)
    }

    /// Request a recomputation without waiting for it
    pub fn notify(&self) {
        match self.tx.try_send(()) {
            Ok(()) => {}
            Err(TrySendError::Full(())) => {
                tracing::debug!("Report refresh already pending, coalesced");
            }
            Err(TrySendError::Closed(())) => {
                tracing::warn!("Report worker is gone, refresh request dropped");
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: Duration::from_millis(50),
        }
    }

    /// Exponential backoff before attempt `attempt + 1`
    fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

/// Result of one signalled recomputation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Updated { attempts: u32 },
    /// Report row missing, nothing to do
    Skipped,
    /// Terminal failure, logged and dropped
    Dropped { attempts: u32 },
}

pub struct ReportWorker<S> {
    store: S,
    policy: RetryPolicy,
}

impl<S: ReportStore> ReportWorker<S> {
    pub fn new(store: S, policy: RetryPolicy) -> Self {
        Self { store, policy }
    }

    /// Consume signals until the channel closes or `shutdown` fires. A signal
    /// already queued at shutdown is still served.
    pub async fn run(self, mut rx: mpsc::Receiver<()>, shutdown: CancellationToken) {
        tracing::info!("Report worker started");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    if rx.try_recv().is_ok() {
                        self.run_once().await;
                    }
                    break;
                }
                signal = rx.recv() => match signal {
                    Some(()) => {
                        self.run_once().await;
                    }
                    None => break,
                },
            }
        }

        tracing::info!("Report worker stopped");
    }

    pub async fn run_once(&self) -> RunOutcome {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.store.recompute().await {
                Ok(true) => {
                    tracing::debug!(attempts = attempt, "Transaction report recomputed");
                    return RunOutcome::Updated { attempts: attempt };
                }
                Ok(false) => {
                    tracing::warn!("Transaction report row missing, recomputation skipped");
                    return RunOutcome::Skipped;
                }
                Err(e) if is_retryable(&e) && attempt < self.policy.max_attempts => {
                    let delay = self.policy.delay_after(attempt);
                    tracing::warn!(
                        error = %e,
                        attempt,
                        retry_in_ms = delay.as_millis() as u64,
                        "Transaction report recomputation conflicted, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        attempts = attempt,
                        "Transaction report recomputation failed, refresh dropped"
                    );
                    return RunOutcome::Dropped { attempts: attempt };
                }
            }
        }
    }
}
