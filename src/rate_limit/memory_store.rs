use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use super::store::{RateLimitRecord, RateLimitStore, StoreError};
use super::window::Window;

/// Process-local store. Counters do not survive a restart, so this is only
/// meant for development and tests.
#[derive(Debug, Default)]
pub struct MemoryRateLimitStore {
    records: DashMap<(String, DateTime<Utc>), RateLimitRecord>,
}

impl MemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records kept for a user across all days.
    pub fn records_for(&self, user_id: &str) -> usize {
        self.records
            .iter()
            .filter(|entry| entry.key().0 == user_id)
            .count()
    }

    fn bump(&self, user_id: &str, window: &Window, now: DateTime<Utc>) -> u32 {
        // the shard lock held by `entry` makes create-or-increment atomic
        let mut record = self
            .records
            .entry((user_id.to_string(), window.start))
            .and_modify(|record| record.count += 1)
            .or_insert_with(|| RateLimitRecord {
                user_id: user_id.to_string(),
                window_start: window.start,
                count: 1,
                created_at: now,
            });
        record.value_mut().count
    }
}

#[async_trait]
impl RateLimitStore for MemoryRateLimitStore {
    async fn find(
        &self,
        user_id: &str,
        window: &Window,
    ) -> Result<Option<RateLimitRecord>, StoreError> {
        Ok(self
            .records
            .get(&(user_id.to_string(), window.start))
            .map(|entry| entry.value().clone()))
    }

    async fn insert_or_increment(
        &self,
        user_id: &str,
        window: &Window,
        now: DateTime<Utc>,
    ) -> Result<u32, StoreError> {
        Ok(self.bump(user_id, window, now))
    }

    async fn increment(
        &self,
        user_id: &str,
        window: &Window,
        now: DateTime<Utc>,
    ) -> Result<u32, StoreError> {
        Ok(self.bump(user_id, window, now))
    }
}
