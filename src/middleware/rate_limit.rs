use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{AppState, error::AppError, middleware::CurrentUser};

/// Gates the wrapped routes on the caller's daily quota.
///
/// Must sit inside an auth layer. Anonymous requests pass through without
/// being counted; routes that require identity reject them earlier. On
/// success the [`RateLimitOutcome`](crate::rate_limit::RateLimitOutcome) is
/// stored in the request extensions so handlers can report the remaining quota.
pub async fn daily_quota(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let Some(user) = req.extensions().get::<CurrentUser>().cloned() else {
        return next.run(req).await;
    };

    let outcome = state
        .limiter
        .check(&user.user_id, state.config.daily_request_limit)
        .await;

    if !outcome.allowed {
        return AppError::RateLimited(outcome).into_response();
    }

    req.extensions_mut().insert(outcome);
    next.run(req).await
}
