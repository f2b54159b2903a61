use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

/// Actions this service records on its own behalf. Clients may log any
/// other action name through the activity endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityAction {
    Created,
    Searched,
    Deleted,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::Created => "created",
            ActivityAction::Searched => "searched",
            ActivityAction::Deleted => "deleted",
        }
    }

    /// Stats change applied when the service records this action.
    pub fn stat_change(&self) -> StatChange {
        match self {
            ActivityAction::Created => Some((StatCounter::AcronymsCreated, 1)),
            ActivityAction::Searched => Some((StatCounter::SearchCount, 1)),
            ActivityAction::Deleted => Some((StatCounter::AcronymsCreated, -1)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatCounter {
    AcronymsCreated,
    TotalVotes,
    SearchCount,
}

impl StatCounter {
    fn column(&self) -> &'static str {
        match self {
            StatCounter::AcronymsCreated => "acronyms_created",
            StatCounter::TotalVotes => "total_votes",
            StatCounter::SearchCount => "search_count",
        }
    }
}

/// Counter and delta, or `None` to only refresh `last_activity`.
pub type StatChange = Option<(StatCounter, i32)>;

/// Stats change for an action name logged by a client. Unknown names are
/// still recorded but leave the counters alone.
pub fn logged_stat_change(action: &str) -> StatChange {
    match action {
        "created" => Some((StatCounter::AcronymsCreated, 1)),
        "voted" => Some((StatCounter::TotalVotes, 1)),
        "searched" => Some((StatCounter::SearchCount, 1)),
        _ => None,
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserActivity {
    pub id: Uuid,
    pub user_id: String,
    pub action: String,
    pub acronym: String,
    pub acronym_id: Option<String>,
    pub metadata: Option<serde_json::Value>,
    #[sqlx(rename = "created_at")]
    pub timestamp: DateTime<Utc>,
}

impl UserActivity {
    pub fn new(
        user_id: &str,
        action: &str,
        acronym: &str,
        acronym_id: Option<String>,
        metadata: Option<serde_json::Value>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            action: action.to_string(),
            acronym: acronym.to_string(),
            acronym_id,
            metadata,
            timestamp: Utc::now(),
        }
    }

    /// Human readable line shown in activity feeds.
    pub fn description(&self) -> String {
        match self.action.as_str() {
            "created" => format!("Created \"{}\" acronym", self.acronym),
            "voted" => format!("Voted on \"{}\"", self.acronym),
            "searched" => format!("Searched for \"{}\"", self.acronym),
            "commented" => format!("Commented on \"{}\"", self.acronym),
            "followed" => "Started following a user".to_string(),
            "achievement" => {
                let title = self
                    .metadata
                    .as_ref()
                    .and_then(|m| m.get("achievementTitle"))
                    .and_then(|t| t.as_str())
                    .unwrap_or("an");
                format!("Unlocked \"{}\" achievement", title)
            }
            other => format!("Performed {} action", other),
        }
    }

    pub async fn insert(&self, pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO user_activities (id, user_id, action, acronym, acronym_id, metadata, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(self.id)
        .bind(&self.user_id)
        .bind(&self.action)
        .bind(&self.acronym)
        .bind(&self.acronym_id)
        .bind(&self.metadata)
        .bind(self.timestamp)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Most recent activities of a user, newest first.
    pub async fn recent(pool: &PgPool, user_id: &str, limit: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT id, user_id, action, acronym, acronym_id, metadata, created_at
            FROM user_activities
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub user_id: String,
    pub acronyms_created: i32,
    pub total_votes: i32,
    pub votes_received: i32,
    pub followers: i32,
    pub following: i32,
    pub search_count: i32,
    pub last_activity: DateTime<Utc>,
    pub joined_at: DateTime<Utc>,
}

const STATS_COLUMNS: &str = "user_id, acronyms_created, total_votes, votes_received, followers, \
                             following, search_count, last_activity, joined_at";

impl UserStats {
    pub fn empty(user_id: &str) -> Self {
        let now = Utc::now();
        Self {
            user_id: user_id.to_string(),
            acronyms_created: 0,
            total_votes: 0,
            votes_received: 0,
            followers: 0,
            following: 0,
            search_count: 0,
            last_activity: now,
            joined_at: now,
        }
    }

    pub async fn find(pool: &PgPool, user_id: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {} FROM user_stats WHERE user_id = $1",
            STATS_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Creates the row on first visit and refreshes `last_activity`.
    pub async fn touch(pool: &PgPool, user_id: &str) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            r#"
            INSERT INTO user_stats (user_id, last_activity)
            VALUES ($1, NOW())
            ON CONFLICT (user_id)
            DO UPDATE SET last_activity = NOW()
            RETURNING {}
            "#,
            STATS_COLUMNS
        ))
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Applies `change` and refreshes `last_activity`, creating the row on
    /// first use.
    pub async fn bump(pool: &PgPool, user_id: &str, change: StatChange) -> Result<(), sqlx::Error> {
        let Some((counter, delta)) = change else {
            Self::touch(pool, user_id).await?;
            return Ok(());
        };

        let sql = format!(
            r#"
            INSERT INTO user_stats (user_id, {col}, last_activity)
            VALUES ($1, GREATEST($2, 0), NOW())
            ON CONFLICT (user_id)
            DO UPDATE SET {col} = GREATEST(user_stats.{col} + $2, 0), last_activity = NOW()
            "#,
            col = counter.column()
        );
        sqlx::query(&sql)
            .bind(user_id)
            .bind(delta)
            .execute(pool)
            .await?;

        Ok(())
    }
}

/// Records an activity and applies its stats change.
pub async fn record_activity(
    pool: &PgPool,
    activity: &UserActivity,
    change: StatChange,
) -> Result<(), sqlx::Error> {
    activity.insert(pool).await?;
    UserStats::bump(pool, &activity.user_id, change).await
}
