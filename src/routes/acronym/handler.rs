use axum::{
    Json,
    extract::{Extension, Query, State},
};
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use super::model::{Acronym, CreateAcronymRequest};
use crate::{
    AppState,
    error::AppError,
    middleware::CurrentUser,
    rate_limit::RateLimitOutcome,
    routes::activity::model::{ActivityAction, UserActivity, record_activity},
    utils::iso8601,
};

#[derive(Debug, Deserialize)]
pub struct DeleteAcronymQuery {
    id: Option<String>,
}

// 当前用户创建的缩写，按时间倒序
pub async fn list_acronyms(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Value>, AppError> {
    let acronyms = Acronym::find_by_owner(&state.pool, &user.user_id, None).await?;
    Ok(Json(json!({ "acronyms": acronyms })))
}

/// Runs behind `daily_quota`, so one unit of quota is already spent here,
/// even when the body turns out to be invalid.
pub async fn create_acronym(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Extension(quota): Extension<RateLimitOutcome>,
    Json(req): Json<CreateAcronymRequest>,
) -> Result<Json<Value>, AppError> {
    let acronym = req
        .into_acronym(&user.user_id)
        .ok_or_else(|| AppError::BadRequest("Acronym and full form are required".into()))?;

    acronym.insert(&state.pool).await?;

    let activity = UserActivity::new(
        &user.user_id,
        ActivityAction::Created.as_str(),
        &acronym.acronym,
        Some(acronym.id.to_string()),
        Some(json!({ "acronymId": acronym.id })),
    );
    record_activity(&state.pool, &activity, ActivityAction::Created.stat_change()).await?;

    tracing::info!(user_id = %user.user_id, acronym = %acronym.acronym, "acronym created");

    Ok(Json(json!({
        "success": true,
        "acronym": acronym,
        "rateLimitInfo": {
            "remaining": quota.remaining,
            "resetTime": iso8601(quota.reset_time),
        },
    })))
}

pub async fn delete_acronym(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<DeleteAcronymQuery>,
) -> Result<Json<Value>, AppError> {
    let id = query
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("Acronym ID is required".into()))?;
    // 非法 id 与不存在同样处理
    let not_found = || AppError::NotFound("Acronym not found or unauthorized".into());
    let id = Uuid::parse_str(&id).map_err(|_| not_found())?;

    let deleted = Acronym::delete_owned(&state.pool, id, &user.user_id)
        .await?
        .ok_or_else(not_found)?;

    let activity = UserActivity::new(
        &user.user_id,
        ActivityAction::Deleted.as_str(),
        &deleted.acronym,
        None,
        Some(json!({ "deletedAcronymId": deleted.id })),
    );
    record_activity(&state.pool, &activity, ActivityAction::Deleted.stat_change()).await?;

    Ok(Json(json!({ "success": true })))
}

const TRENDING_DAYS: i64 = 7;
const TRENDING_MIN_VOTES: i32 = 5;
const TRENDING_LIMIT: i64 = 20;

// 热门缩写，库中为空时写入示例数据
pub async fn trending_acronyms(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let since = Utc::now() - Duration::days(TRENDING_DAYS);
    let mut acronyms =
        Acronym::trending(&state.pool, since, TRENDING_MIN_VOTES, TRENDING_LIMIT).await?;

    if acronyms.is_empty() {
        tracing::info!("no trending acronyms yet, seeding samples");
        acronyms = Acronym::seed_samples(&state.pool).await?;
    }

    Ok(Json(json!({ "acronyms": acronyms })))
}
