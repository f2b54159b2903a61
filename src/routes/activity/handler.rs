use axum::{
    Json,
    extract::{Extension, State},
};
use serde::Deserialize;
use serde_json::{Value, json};

use super::model::{UserActivity, logged_stat_change, record_activity};
use crate::{AppState, error::AppError, middleware::CurrentUser};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogActivityRequest {
    action: Option<String>,
    acronym: Option<String>,
    acronym_id: Option<String>,
    metadata: Option<Value>,
}

// 记录用户活动，未知的 action 只记录不计数
pub async fn log_activity(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<LogActivityRequest>,
) -> Result<Json<Value>, AppError> {
    let (Some(action), Some(acronym)) = (
        req.action.filter(|a| !a.trim().is_empty()),
        req.acronym.filter(|a| !a.is_empty()),
    ) else {
        return Err(AppError::BadRequest(
            "Action and acronym are required".into(),
        ));
    };

    let activity = UserActivity::new(&user.user_id, &action, &acronym, req.acronym_id, req.metadata);
    record_activity(&state.pool, &activity, logged_stat_change(&action)).await?;

    Ok(Json(json!({ "success": true })))
}
