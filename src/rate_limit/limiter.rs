use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, Utc};
use serde::Serialize;

use super::clock::{Clock, SystemClock};
use super::store::{RateLimitStore, StoreError};
use super::window::Window;

/// Result of a `check` or `status` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitOutcome {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RateLimitOutcome {
    fn allowed(limit: u32, used: u32, reset_time: DateTime<Utc>) -> Self {
        Self {
            allowed: true,
            limit,
            remaining: limit.saturating_sub(used),
            reset_time,
            message: None,
        }
    }

    fn exhausted(limit: u32, reset_time: DateTime<Utc>) -> Self {
        Self {
            allowed: false,
            limit,
            remaining: 0,
            reset_time,
            message: Some(exceeded_message(limit)),
        }
    }

    /// Outcome used when the store cannot be reached. The real window is
    /// unknown, so the reset time is a day from now rather than midnight.
    fn fail_open(limit: u32, used: u32, now: DateTime<Utc>) -> Self {
        Self::allowed(limit, used, now + Duration::hours(24))
    }
}

pub fn exceeded_message(limit: u32) -> String {
    format!(
        "Rate limit exceeded. You can make {} requests per day. Please try again tomorrow.",
        limit
    )
}

/// Fixed-window daily quota per user, persisted in a [`RateLimitStore`].
///
/// The limiter keeps no state of its own between calls; every guarantee
/// comes from the store's atomic writes. Store failures never reach the
/// caller: `check` and `status` fail open and log the error.
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    clock: Arc<dyn Clock>,
    offset: FixedOffset,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn RateLimitStore>, offset: FixedOffset) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            offset,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[cfg(test)]
    pub fn current_window(&self) -> Window {
        Window::containing(self.clock.now(), self.offset)
    }

    /// Consumes one unit of today's quota if any is left.
    pub async fn check(&self, user_id: &str, limit: u32) -> RateLimitOutcome {
        let now = self.clock.now();
        let window = Window::containing(now, self.offset);

        match self.try_check(user_id, limit, &window, now).await {
            Ok(outcome) => {
                if !outcome.allowed {
                    tracing::info!(user_id, limit, "daily rate limit reached");
                }
                outcome
            }
            Err(err) => {
                tracing::error!(user_id, error = %err, "rate limit check failed, allowing request");
                RateLimitOutcome::fail_open(limit, 1, now)
            }
        }
    }

    /// Reports today's usage without consuming anything.
    pub async fn status(&self, user_id: &str, limit: u32) -> RateLimitOutcome {
        let now = self.clock.now();
        let window = Window::containing(now, self.offset);

        match self.store.find(user_id, &window).await {
            Ok(None) => RateLimitOutcome::allowed(limit, 0, window.end),
            Ok(Some(record)) if record.count >= limit => {
                RateLimitOutcome::exhausted(limit, window.end)
            }
            Ok(Some(record)) => RateLimitOutcome::allowed(limit, record.count, window.end),
            Err(err) => {
                tracing::error!(user_id, error = %err, "rate limit status failed");
                RateLimitOutcome::fail_open(limit, 0, now)
            }
        }
    }

    async fn try_check(
        &self,
        user_id: &str,
        limit: u32,
        window: &Window,
        now: DateTime<Utc>,
    ) -> Result<RateLimitOutcome, StoreError> {
        if limit == 0 {
            return Ok(RateLimitOutcome::exhausted(limit, window.end));
        }

        let count = match self.store.find(user_id, window).await? {
            None => self.store.insert_or_increment(user_id, window, now).await?,
            Some(record) if record.count >= limit => {
                return Ok(RateLimitOutcome::exhausted(limit, window.end));
            }
            Some(_) => self.store.increment(user_id, window, now).await?,
        };
        tracing::debug!(user_id, count, limit, "consumed daily quota");

        Ok(RateLimitOutcome::allowed(limit, count, window.end))
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::TimeZone;

    use super::*;
    use crate::rate_limit::{ManualClock, MemoryRateLimitStore, RateLimitRecord};

    struct FailingStore;

    #[async_trait]
    impl RateLimitStore for FailingStore {
        async fn find(&self, _: &str, _: &Window) -> Result<Option<RateLimitRecord>, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }

        async fn insert_or_increment(
            &self,
            _: &str,
            _: &Window,
            _: DateTime<Utc>,
        ) -> Result<u32, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }

        async fn increment(
            &self,
            _: &str,
            _: &Window,
            _: DateTime<Utc>,
        ) -> Result<u32, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 17, 9, 15, 0).unwrap()
    }

    fn limiter() -> (RateLimiter, Arc<MemoryRateLimitStore>, Arc<ManualClock>) {
        let store = Arc::new(MemoryRateLimitStore::new());
        let clock = Arc::new(ManualClock::new(start()));
        let limiter = RateLimiter::new(store.clone(), utc()).with_clock(clock.clone());
        (limiter, store, clock)
    }

    #[tokio::test]
    async fn fresh_user_gets_two_then_denied() {
        let (limiter, _, _) = limiter();
        let midnight = Utc.with_ymd_and_hms(2026, 10, 18, 0, 0, 0).unwrap();

        let first = limiter.check("user_a", 2).await;
        assert!(first.allowed);
        assert_eq!(first.remaining, 1);
        assert_eq!(first.reset_time, midnight);

        let second = limiter.check("user_a", 2).await;
        assert!(second.allowed);
        assert_eq!(second.remaining, 0);

        let third = limiter.check("user_a", 2).await;
        assert!(!third.allowed);
        assert_eq!(third.remaining, 0);
        assert_eq!(third.reset_time, midnight);
        assert!(third.message.unwrap().contains("2 requests per day"));
    }

    #[tokio::test]
    async fn denial_does_not_write() {
        let (limiter, store, _) = limiter();
        for _ in 0..5 {
            limiter.check("user_a", 2).await;
        }
        let record = store.find("user_a", &limiter.current_window()).await.unwrap().unwrap();
        assert_eq!(record.count, 2);
    }

    #[tokio::test]
    async fn remaining_tracks_count_for_larger_limits() {
        let (limiter, store, _) = limiter();
        let mut previous = u32::MAX;
        for n in 1..=5u32 {
            let outcome = limiter.check("user_a", 5).await;
            assert!(outcome.allowed);
            assert!(outcome.remaining <= previous);
            let count = store
                .find("user_a", &limiter.current_window())
                .await
                .unwrap()
                .unwrap()
                .count;
            assert_eq!(count, n);
            assert_eq!(outcome.remaining, 5 - count);
            previous = outcome.remaining;
        }
        assert!(!limiter.check("user_a", 5).await.allowed);
    }

    #[tokio::test]
    async fn status_before_any_check_reports_full_quota() {
        let (limiter, store, _) = limiter();
        let status = limiter.status("user_a", 2).await;
        assert!(status.allowed);
        assert_eq!(status.remaining, 2);
        assert_eq!(status.message, None);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn status_after_exhaustion() {
        let (limiter, _, _) = limiter();
        limiter.check("user_a", 2).await;
        limiter.check("user_a", 2).await;

        let status = limiter.status("user_a", 2).await;
        assert!(!status.allowed);
        assert_eq!(status.remaining, 0);
        assert!(status.message.is_some());
    }

    #[tokio::test]
    async fn status_never_consumes() {
        let (plain, _, _) = limiter();
        let (interleaved, _, _) = limiter();

        let mut expected = Vec::new();
        for _ in 0..3 {
            expected.push(plain.check("user_a", 2).await.remaining);
        }

        let mut observed = Vec::new();
        for _ in 0..3 {
            for _ in 0..4 {
                interleaved.status("user_a", 2).await;
            }
            observed.push(interleaved.check("user_a", 2).await.remaining);
        }
        assert_eq!(observed, expected);
    }

    #[tokio::test]
    async fn quota_resets_on_the_next_day() {
        let (limiter, store, clock) = limiter();
        limiter.check("user_a", 2).await;
        limiter.check("user_a", 2).await;
        assert!(!limiter.check("user_a", 2).await.allowed);

        clock.set(Utc.with_ymd_and_hms(2026, 10, 18, 0, 0, 1).unwrap());

        let status = limiter.status("user_a", 2).await;
        assert!(status.allowed);
        assert_eq!(status.remaining, 2);

        let check = limiter.check("user_a", 2).await;
        assert!(check.allowed);
        assert_eq!(check.remaining, 1);
        assert_eq!(check.reset_time, Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap());
        // yesterday's record is left in place
        assert_eq!(store.records_for("user_a"), 2);
    }

    #[tokio::test]
    async fn day_boundary_follows_configured_offset() {
        let store = Arc::new(MemoryRateLimitStore::new());
        // 21:00 UTC is 23:00 at +02:00
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2026, 10, 17, 21, 0, 0).unwrap()));
        let limiter = RateLimiter::new(store, FixedOffset::east_opt(2 * 3600).unwrap())
            .with_clock(clock.clone());

        limiter.check("user_a", 1).await;
        assert!(!limiter.check("user_a", 1).await.allowed);

        // 22:30 UTC is past midnight at +02:00
        clock.advance(Duration::minutes(90));
        assert!(limiter.check("user_a", 1).await.allowed);
    }

    #[tokio::test]
    async fn users_are_isolated() {
        let (limiter, _, _) = limiter();
        limiter.check("user_a", 2).await;
        limiter.check("user_a", 2).await;
        assert!(!limiter.check("user_a", 2).await.allowed);

        let other = limiter.check("user_b", 2).await;
        assert!(other.allowed);
        assert_eq!(other.remaining, 1);
        assert_eq!(limiter.status("user_b", 2).await.remaining, 1);
    }

    #[tokio::test]
    async fn failing_store_fails_open() {
        let clock = Arc::new(ManualClock::new(start()));
        let limiter = RateLimiter::new(Arc::new(FailingStore), utc()).with_clock(clock);

        let check = limiter.check("user_a", 2).await;
        assert!(check.allowed);
        assert_eq!(check.remaining, 1);
        assert_eq!(check.reset_time, start() + Duration::hours(24));
        assert_eq!(check.message, None);

        let status = limiter.status("user_a", 2).await;
        assert!(status.allowed);
        assert_eq!(status.remaining, 2);
        assert_eq!(status.reset_time, start() + Duration::hours(24));
    }

    #[tokio::test]
    async fn zero_limit_denies_without_writing() {
        let (limiter, store, _) = limiter();
        let outcome = limiter.check("user_a", 0).await;
        assert!(!outcome.allowed);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn concurrent_checks_only_overshoot_by_racers() {
        let (limiter, store, _) = limiter();
        let limiter = Arc::new(limiter);

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let limiter = limiter.clone();
                tokio::spawn(async move { limiter.check("user_a", 2).await })
            })
            .collect();
        let mut allowed = 0;
        for task in tasks {
            if task.await.unwrap().allowed {
                allowed += 1;
            }
        }

        assert!(allowed >= 2);
        assert_eq!(store.records_for("user_a"), 1);
        let count = store.find("user_a", &limiter.current_window()).await.unwrap().unwrap().count;
        assert_eq!(count, allowed);
    }

    #[test]
    fn outcome_serializes_camel_case() {
        let outcome = RateLimitOutcome::allowed(2, 1, start());
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["remaining"], 1);
        assert_eq!(json["resetTime"], "2026-10-17T09:15:00Z");
        assert!(json.get("message").is_none());
    }
}
