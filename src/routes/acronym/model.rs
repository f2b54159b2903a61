use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

const DEFAULT_INDUSTRY: &str = "General";

const ACRONYM_COLUMNS: &str = "id, acronym, full_form, industry, context, tags, created_by, \
                               created_at, votes, popularity, trending, emoji";

// acronym, full form, industry, context, popularity, tags, emoji, votes
type Sample = (
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    i32,
    [&'static str; 3],
    &'static str,
    i32,
);

const SAMPLES: &[Sample] = &[
    (
        "FIRE",
        "Fueling Innovation, Reaching Everyone",
        "Technology",
        "Used in tech startups when describing breakthrough innovations and scalable solutions.",
        95,
        ["tech", "innovation", "startup"],
        "🚀",
        245,
    ),
    (
        "FLEX",
        "Future Leading Excellence Experience",
        "Social Media",
        "Popular among Gen-Z for expressing confidence and showing off achievements.",
        92,
        ["social", "genz", "confidence"],
        "💪",
        189,
    ),
    (
        "VIBE",
        "Very Inspiring Bold Energy",
        "Entertainment",
        "Used to describe positive energy and good feelings in social situations.",
        88,
        ["mood", "positive", "energy"],
        "✨",
        156,
    ),
    (
        "GOALS",
        "Great Opportunities Achieving Life Success",
        "Lifestyle",
        "Used when something represents aspirational lifestyle or achievements.",
        85,
        ["lifestyle", "motivation", "success"],
        "🎯",
        134,
    ),
    (
        "MOOD",
        "Magnificent Outlook, Outstanding Day",
        "Social Media",
        "Used to express current emotional state or relate to content.",
        82,
        ["emotion", "relatable", "social"],
        "😍",
        112,
    ),
    (
        "GLOW",
        "Generating Light, Overcoming Worries",
        "Lifestyle",
        "Used to describe personal transformation and positive change.",
        79,
        ["transformation", "positive", "lifestyle"],
        "🌟",
        98,
    ),
];

/// Starter acronyms owned by `system`, shown while nothing is trending yet.
pub fn sample_acronyms(now: DateTime<Utc>) -> Vec<Acronym> {
    SAMPLES
        .iter()
        .map(
            |&(acronym, full_form, industry, context, popularity, tags, emoji, votes)| Acronym {
                id: Uuid::new_v4(),
                acronym: acronym.to_string(),
                full_form: full_form.to_string(),
                industry: industry.to_string(),
                context: context.to_string(),
                tags: tags.iter().map(|t| t.to_string()).collect(),
                created_by: "system".to_string(),
                created_at: now,
                votes,
                popularity,
                trending: true,
                emoji: emoji.to_string(),
            },
        )
        .collect()
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Acronym {
    pub id: Uuid,
    pub acronym: String,
    pub full_form: String,
    pub industry: String,
    pub context: String,
    pub tags: Vec<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub votes: i32,
    pub popularity: i32,
    pub trending: bool,
    pub emoji: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAcronymRequest {
    pub acronym: Option<String>,
    pub full_form: Option<String>,
    pub industry: Option<String>,
    pub context: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl CreateAcronymRequest {
    /// Builds the stored acronym, or `None` when acronym or full form is missing.
    pub fn into_acronym(self, owner: &str) -> Option<Acronym> {
        let acronym = self.acronym.filter(|a| !a.trim().is_empty())?;
        let full_form = self.full_form.filter(|f| !f.trim().is_empty())?;

        Some(Acronym {
            id: Uuid::new_v4(),
            acronym: acronym.to_uppercase(),
            full_form,
            industry: self
                .industry
                .filter(|i| !i.is_empty())
                .unwrap_or_else(|| DEFAULT_INDUSTRY.to_string()),
            context: self.context.unwrap_or_default(),
            tags: self.tags.unwrap_or_default(),
            created_by: owner.to_string(),
            created_at: Utc::now(),
            votes: 0,
            popularity: 0,
            trending: false,
            emoji: String::new(),
        })
    }
}

impl Acronym {
    pub async fn insert<'e, E>(&self, executor: E) -> Result<(), sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query(
            r#"
            INSERT INTO acronyms
                (id, acronym, full_form, industry, context, tags, created_by, created_at, votes, popularity, trending, emoji)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(self.id)
        .bind(&self.acronym)
        .bind(&self.full_form)
        .bind(&self.industry)
        .bind(&self.context)
        .bind(&self.tags)
        .bind(&self.created_by)
        .bind(self.created_at)
        .bind(self.votes)
        .bind(self.popularity)
        .bind(self.trending)
        .bind(&self.emoji)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Newest first. `None` returns every row.
    pub async fn find_by_owner(
        pool: &PgPool,
        owner: &str,
        limit: Option<i64>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {} FROM acronyms WHERE created_by = $1 ORDER BY created_at DESC LIMIT $2",
            ACRONYM_COLUMNS
        ))
        .bind(owner)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Flagged trending or created since `since`, most voted first.
    pub async fn recent_or_trending(
        pool: &PgPool,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            r#"
            SELECT {} FROM acronyms
            WHERE trending OR created_at >= $1
            ORDER BY votes DESC, created_at DESC
            LIMIT $2
            "#,
            ACRONYM_COLUMNS
        ))
        .bind(since)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Flagged trending, or created since `since` with at least `min_votes`.
    pub async fn trending(
        pool: &PgPool,
        since: DateTime<Utc>,
        min_votes: i32,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            r#"
            SELECT {} FROM acronyms
            WHERE trending OR (created_at >= $1 AND votes >= $2)
            ORDER BY votes DESC, popularity DESC, created_at DESC
            LIMIT $3
            "#,
            ACRONYM_COLUMNS
        ))
        .bind(since)
        .bind(min_votes)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Inserts the starter set in one transaction and returns it.
    pub async fn seed_samples(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let samples = sample_acronyms(Utc::now());
        let mut tx = pool.begin().await?;
        for acronym in &samples {
            acronym.insert(&mut *tx).await?;
        }
        tx.commit().await?;

        Ok(samples)
    }

    /// Deletes the acronym only if `owner` created it. Returns the deleted row.
    pub async fn delete_owned(
        pool: &PgPool,
        id: Uuid,
        owner: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            DELETE FROM acronyms
            WHERE id = $1 AND created_by = $2
            RETURNING id, acronym, full_form, industry, context, tags, created_by, created_at,
                      votes, popularity, trending, emoji
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(pool)
        .await
    }
}
