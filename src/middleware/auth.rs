use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use crate::{AppState, error::AppError, utils::verify_token};

/// Authenticated caller, inserted into request extensions by the auth layers.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: String,
}

fn identify(
    state: &AppState,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
) -> Option<CurrentUser> {
    let TypedHeader(auth) = bearer?;
    match verify_token(auth.token(), &state.config) {
        Ok(claims) if !claims.sub.is_empty() => Some(CurrentUser { user_id: claims.sub }),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!("token rejected: {}", e);
            None
        }
    }
}

/// 需要登录的路由
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match identify(&state, bearer) {
        Some(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        None => AppError::Unauthorized.into_response(),
    }
}

/// 匿名也可访问的路由，有有效令牌时注入 `CurrentUser`
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(user) = identify(&state, bearer) {
        req.extensions_mut().insert(user);
    }
    next.run(req).await
}
