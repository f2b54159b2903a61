use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::store::{RateLimitRecord, RateLimitStore, StoreError};
use super::window::Window;

#[derive(Debug, sqlx::FromRow)]
struct RateLimitRow {
    user_id: String,
    window_start: DateTime<Utc>,
    count: i32,
    created_at: DateTime<Utc>,
}

impl TryFrom<RateLimitRow> for RateLimitRecord {
    type Error = StoreError;

    fn try_from(row: RateLimitRow) -> Result<Self, Self::Error> {
        let count = u32::try_from(row.count)
            .map_err(|_| StoreError::Corrupt(format!("negative count {}", row.count)))?;
        Ok(Self {
            user_id: row.user_id,
            window_start: row.window_start,
            count,
            created_at: row.created_at,
        })
    }
}

/// Counters in the `rate_limits` table. The unique index on
/// `(user_id, window_start)` turns a racing first insert into an increment.
#[derive(Clone)]
pub struct PgRateLimitStore {
    pool: PgPool,
}

impl PgRateLimitStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn to_count(count: i32) -> Result<u32, StoreError> {
    u32::try_from(count).map_err(|_| StoreError::Corrupt(format!("negative count {}", count)))
}

#[async_trait]
impl RateLimitStore for PgRateLimitStore {
    async fn find(
        &self,
        user_id: &str,
        window: &Window,
    ) -> Result<Option<RateLimitRecord>, StoreError> {
        let row = sqlx::query_as::<_, RateLimitRow>(
            r#"
            SELECT user_id, window_start, count, created_at
            FROM rate_limits
            WHERE user_id = $1
              AND window_start >= $2
              AND window_start < $3
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(window.start)
        .bind(window.end)
        .fetch_optional(&self.pool)
        .await?;

        row.map(RateLimitRecord::try_from).transpose()
    }

    async fn insert_or_increment(
        &self,
        user_id: &str,
        window: &Window,
        now: DateTime<Utc>,
    ) -> Result<u32, StoreError> {
        let count: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO rate_limits (user_id, window_start, count, created_at)
            VALUES ($1, $2, 1, $3)
            ON CONFLICT (user_id, window_start)
            DO UPDATE SET count = rate_limits.count + 1
            RETURNING count
            "#,
        )
        .bind(user_id)
        .bind(window.start)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        to_count(count)
    }

    async fn increment(
        &self,
        user_id: &str,
        window: &Window,
        now: DateTime<Utc>,
    ) -> Result<u32, StoreError> {
        let count: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE rate_limits
            SET count = count + 1
            WHERE user_id = $1 AND window_start = $2
            RETURNING count
            "#,
        )
        .bind(user_id)
        .bind(window.start)
        .fetch_optional(&self.pool)
        .await?;

        match count {
            Some(count) => to_count(count),
            // record vanished between the lookup and the write
            None => self.insert_or_increment(user_id, window, now).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::FixedOffset;
    use sqlx::postgres::PgPoolOptions;
    use uuid::Uuid;

    use super::*;

    const RACERS: u32 = 16;

    // 需要真实数据库: DATABASE_URL=... cargo test -- --ignored
    #[tokio::test]
    #[ignore = "needs a Postgres instance in DATABASE_URL"]
    async fn concurrent_first_writes_share_one_row() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = PgPoolOptions::new()
            .max_connections(RACERS)
            .connect(&url)
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();

        let store = PgRateLimitStore::new(pool.clone());
        let user_id = format!("race_{}", Uuid::new_v4());
        let now = Utc::now();
        let window = Window::containing(now, FixedOffset::east_opt(0).unwrap());

        let handles: Vec<_> = (0..RACERS)
            .map(|_| {
                let store = store.clone();
                let user_id = user_id.clone();
                tokio::spawn(async move { store.insert_or_increment(&user_id, &window, now).await })
            })
            .collect();
        let mut counts = Vec::new();
        for handle in handles {
            counts.push(handle.await.unwrap().unwrap());
        }
        counts.sort_unstable();
        assert_eq!(counts, (1..=RACERS).collect::<Vec<_>>());

        let (rows, count): (i64, i32) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(MAX(count), 0) FROM rate_limits WHERE user_id = $1",
        )
        .bind(&user_id)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(rows, 1);
        assert_eq!(count, RACERS as i32);

        let record = store.find(&user_id, &window).await.unwrap().unwrap();
        assert_eq!(record.count, RACERS);

        sqlx::query("DELETE FROM rate_limits WHERE user_id = $1")
            .bind(&user_id)
            .execute(&pool)
            .await
            .unwrap();
    }
}
