use axum::{
    Json,
    extract::{Extension, State},
};
use serde::Serialize;
use serde_json::{Value, json};

use crate::{AppState, middleware::CurrentUser, rate_limit::RateLimitOutcome, utils::iso8601};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitStatusResponse {
    pub limit: u32,
    pub remaining: u32,
    pub reset_time: String,
    pub can_make_request: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<RateLimitOutcome> for RateLimitStatusResponse {
    fn from(outcome: RateLimitOutcome) -> Self {
        Self {
            limit: outcome.limit,
            remaining: outcome.remaining,
            reset_time: iso8601(outcome.reset_time),
            can_make_request: outcome.allowed,
            message: outcome.message,
        }
    }
}

// 查询今日额度，不消耗
pub async fn rate_limit_status(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Json<RateLimitStatusResponse> {
    let outcome = state
        .limiter
        .status(&user.user_id, state.config.daily_request_limit)
        .await;
    Json(outcome.into())
}

/// Spends one unit of quota and reports what is left.
pub async fn test_rate_limit(Extension(quota): Extension<RateLimitOutcome>) -> Json<Value> {
    Json(json!({
        "message": "Test API call successful",
        "rateLimitInfo": {
            "remaining": quota.remaining,
            "resetTime": iso8601(quota.reset_time),
            "limit": quota.limit,
        },
    }))
}
