use axum::{
    Json,
    extract::{Extension, State},
};
use chrono::{Duration, Utc};
use serde_json::{Value, json};

use super::model::{ActivityEntry, achievements};
use crate::{
    AppState,
    error::AppError,
    middleware::CurrentUser,
    routes::{
        acronym::model::Acronym,
        activity::model::{UserActivity, UserStats},
    },
};

const RECENT_ACTIVITY_LIMIT: i64 = 10;
const DASHBOARD_TRENDING_DAYS: i64 = 7;
const DASHBOARD_TRENDING_LIMIT: i64 = 6;
const PROFILE_ACRONYM_LIMIT: i64 = 10;

/// Stats, recent activity and a short trending list. The first visit creates
/// the stats row; every visit refreshes `last_activity`.
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Value>, AppError> {
    let stats = UserStats::touch(&state.pool, &user.user_id).await?;
    let activities =
        UserActivity::recent(&state.pool, &user.user_id, RECENT_ACTIVITY_LIMIT).await?;
    let since = Utc::now() - Duration::days(DASHBOARD_TRENDING_DAYS);
    let trending =
        Acronym::recent_or_trending(&state.pool, since, DASHBOARD_TRENDING_LIMIT).await?;

    Ok(Json(json!({
        "userStats": stats,
        "recentActivities": activities,
        "trendingAcronyms": trending,
    })))
}

// 个人主页，不修改统计数据
pub async fn profile(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Value>, AppError> {
    let stats = UserStats::find(&state.pool, &user.user_id)
        .await?
        .unwrap_or_else(|| UserStats::empty(&user.user_id));
    let acronyms =
        Acronym::find_by_owner(&state.pool, &user.user_id, Some(PROFILE_ACRONYM_LIMIT)).await?;
    let activities: Vec<ActivityEntry> =
        UserActivity::recent(&state.pool, &user.user_id, RECENT_ACTIVITY_LIMIT)
            .await?
            .into_iter()
            .map(ActivityEntry::from)
            .collect();

    Ok(Json(json!({
        "achievements": achievements(&stats),
        "stats": stats,
        "acronyms": acronyms,
        "recentActivities": activities,
    })))
}
