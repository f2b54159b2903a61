use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};

use crate::{
    AppState,
    middleware::{auth_middleware, daily_quota, log_errors, optional_auth_middleware},
};

pub mod acronym;
pub mod activity;
pub mod dashboard;
pub mod rate_limit;
pub mod search;

/// Builds the full application router under `config.api_base_uri`.
pub fn build_router(state: AppState) -> Router {
    let quota = || from_fn_with_state(state.clone(), daily_quota);

    // 需要认证的路由，额度检查在认证之后
    let protected_routes = Router::new()
        .route(
            "/acronyms",
            get(acronym::list_acronyms)
                .delete(acronym::delete_acronym)
                .merge(post(acronym::create_acronym).layer(quota())),
        )
        .route(
            "/test-rate-limit",
            get(rate_limit::test_rate_limit).layer(quota()),
        )
        .route("/rate-limit/status", get(rate_limit::rate_limit_status))
        .route("/activity/log", post(activity::log_activity))
        .route("/dashboard", get(dashboard::dashboard))
        .route("/profile", get(dashboard::profile))
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    // 匿名可用的路由
    let public_routes = Router::new()
        .route("/search", post(search::search))
        .route("/trending", get(acronym::trending_acronyms))
        .route_layer(from_fn_with_state(state.clone(), optional_auth_middleware));

    let api = public_routes.merge(protected_routes);
    let base = state.config.api_base_uri.trim_end_matches('/');
    let router = if base.is_empty() {
        Router::new().merge(api)
    } else {
        Router::new().nest(base, api)
    };

    router.layer(from_fn(log_errors)).with_state(state)
}
