use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::db::dao::{DaoResult, RefreshTokenDao};

/// Purges refresh tokens whose `expires_at` has passed.
#[derive(Clone)]
pub struct TokenReaper {
    refresh_tokens: RefreshTokenDao,
    interval: Duration,
}

impl TokenReaper {
    pub fn new(refresh_tokens: RefreshTokenDao, interval: Duration) -> Self {
        Self {
            refresh_tokens,
            interval,
        }
    }

    pub async fn run_once(&self) -> DaoResult<u64> {
        let deleted = self
            .refresh_tokens
            .delete_expired(Utc::now().fixed_offset())
            .await?;
        debug!(deleted, "expired refresh tokens purged");
        Ok(deleted)
    }

    /// Runs for the life of the process. A failed pass is logged and the
    /// next tick tries again.
    pub fn spawn(self) -> JoinHandle<()> {
        info!(interval_secs = self.interval.as_secs(), "starting refresh token reaper");
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            loop {
                ticker.tick().await;
                match self.run_once().await {
                    Ok(0) => {}
                    Ok(deleted) => info!(deleted, "reaped expired refresh tokens"),
                    Err(err) => error!(error = %err, "refresh token reaper pass failed"),
                }
            }
        })
    }
}
