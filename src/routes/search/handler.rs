use axum::{
    Json,
    extract::{Extension, State},
};
use serde::Deserialize;
use serde_json::{Value, json};

use super::generator::generate_acronyms;
use crate::{
    AppState,
    error::AppError,
    middleware::CurrentUser,
    routes::activity::model::{ActivityAction, UserActivity, record_activity},
    utils::iso8601,
};

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    query: Option<String>,
}

/// Anonymous searches are free. Signed-in searches spend daily quota and are
/// recorded in the user's activity.
pub async fn search(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<Value>, AppError> {
    let query = req
        .query
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Query is required".into()))?;
    let limit = state.config.daily_request_limit;

    let mut quota = None;
    if let Some(Extension(user)) = &user {
        let outcome = state.limiter.check(&user.user_id, limit).await;
        if !outcome.allowed {
            return Err(AppError::RateLimited(outcome));
        }

        let activity = UserActivity::new(
            &user.user_id,
            ActivityAction::Searched.as_str(),
            &query,
            None,
            Some(json!({ "searchQuery": query })),
        );
        // 记录失败不影响搜索
        let change = ActivityAction::Searched.stat_change();
        if let Err(e) = record_activity(&state.pool, &activity, change).await {
            tracing::error!(user_id = %user.user_id, "failed to log search activity: {:?}", e);
        }
        quota = Some(outcome);
    }

    let results = generate_acronyms(&query, &mut rand::rng());
    let mut body = json!({ "results": results });

    // 直接使用本次扣减后的额度
    if let Some(quota) = quota {
        body["rateLimitInfo"] = json!({
            "remaining": quota.remaining,
            "searchesRemaining": quota.remaining,
            "resetTime": iso8601(quota.reset_time),
        });
    }

    Ok(Json(body))
}
