use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use redis::{AsyncCommands, Client as RedisClient};

use super::store::{RateLimitRecord, RateLimitStore, StoreError};
use super::window::Window;

const KEY_PREFIX: &str = "rate_limit";
// stale days linger a little past their end before redis drops them
const EXPIRY_GRACE_HOURS: i64 = 24;

/// Counters kept as redis hashes `rate_limit:{user}:{window_start}` holding
/// `count` and `created_at`. `HINCRBY` creates the hash when missing, so the
/// first write of the day cannot duplicate.
#[derive(Clone)]
pub struct RedisRateLimitStore {
    redis: Arc<RedisClient>,
}

impl RedisRateLimitStore {
    pub fn new(redis: Arc<RedisClient>) -> Self {
        Self { redis }
    }

    fn key(user_id: &str, window: &Window) -> String {
        format!("{}:{}:{}", KEY_PREFIX, user_id, window.start.timestamp())
    }

    async fn bump(
        &self,
        user_id: &str,
        window: &Window,
        now: DateTime<Utc>,
    ) -> Result<u32, StoreError> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        let key = Self::key(user_id, window);
        let expire_at = (window.end + Duration::hours(EXPIRY_GRACE_HOURS)).timestamp();

        let (count,): (u32,) = redis::pipe()
            .atomic()
            .hincr(&key, "count", 1)
            .hset_nx(&key, "created_at", now.timestamp_millis())
            .ignore()
            .expire_at(&key, expire_at)
            .ignore()
            .query_async(&mut conn)
            .await?;

        Ok(count)
    }
}

fn parse_record(
    user_id: &str,
    window: &Window,
    fields: &HashMap<String, String>,
) -> Result<RateLimitRecord, StoreError> {
    let count = fields
        .get("count")
        .ok_or_else(|| StoreError::Corrupt("missing count".into()))?
        .parse::<u32>()
        .map_err(|e| StoreError::Corrupt(format!("bad count: {}", e)))?;
    let created_at = fields
        .get("created_at")
        .and_then(|v| v.parse::<i64>().ok())
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .unwrap_or(window.start);

    Ok(RateLimitRecord {
        user_id: user_id.to_string(),
        window_start: window.start,
        count,
        created_at,
    })
}

#[async_trait]
impl RateLimitStore for RedisRateLimitStore {
    async fn find(
        &self,
        user_id: &str,
        window: &Window,
    ) -> Result<Option<RateLimitRecord>, StoreError> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        let fields: HashMap<String, String> = conn.hgetall(Self::key(user_id, window)).await?;

        if fields.is_empty() {
            return Ok(None);
        }
        parse_record(user_id, window, &fields).map(Some)
    }

    async fn insert_or_increment(
        &self,
        user_id: &str,
        window: &Window,
        now: DateTime<Utc>,
    ) -> Result<u32, StoreError> {
        self.bump(user_id, window, now).await
    }

    async fn increment(
        &self,
        user_id: &str,
        window: &Window,
        now: DateTime<Utc>,
    ) -> Result<u32, StoreError> {
        self.bump(user_id, window, now).await
    }
}
