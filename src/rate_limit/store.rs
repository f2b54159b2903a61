use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use super::window::Window;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("postgres error: {0}")]
    Postgres(#[from] sqlx::Error),
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("corrupt rate limit record: {0}")]
    Corrupt(String),
    #[error("rate limit store unavailable: {0}")]
    Unavailable(String),
}

/// One counter per user and counting day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitRecord {
    pub user_id: String,
    pub window_start: DateTime<Utc>,
    pub count: u32,
    pub created_at: DateTime<Utc>,
}

/// Durable counter storage behind the daily limiter.
///
/// Every write must be atomic at the storage layer: the limiter holds no
/// locks and may run in several processes at once.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Looks up the record whose `window_start` falls inside `window`.
    async fn find(
        &self,
        user_id: &str,
        window: &Window,
    ) -> Result<Option<RateLimitRecord>, StoreError>;

    /// Creates the record with `count = 1`. If a concurrent caller created it
    /// first the write becomes an increment. Returns the stored count.
    async fn insert_or_increment(
        &self,
        user_id: &str,
        window: &Window,
        now: DateTime<Utc>,
    ) -> Result<u32, StoreError>;

    /// Atomically adds one to an existing record and returns the new count.
    async fn increment(
        &self,
        user_id: &str,
        window: &Window,
        now: DateTime<Utc>,
    ) -> Result<u32, StoreError>;
}
