//! 认证中间件

use axum::extract::{FromRequestParts, Request, State};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use console_auth_core::AuthContext;
use console_errors::AppError;
use tracing::{debug, warn};

use super::session::read_cookie;
use super::state::AppState;

/// 携带令牌的 cookie 名
pub const AUTH_COOKIE: &str = "authorization";

/// 依次从 `Authorization` 头（可带 `Bearer ` 前缀）和 `authorization` cookie 读取令牌
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let from_header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|raw| raw.strip_prefix("Bearer ").unwrap_or(raw).trim())
        .filter(|token| !token.is_empty());

    from_header
        .or_else(|| read_cookie(headers, AUTH_COOKIE).filter(|token| !token.is_empty()))
        .map(str::to_string)
}

/// 请求令牌
#[derive(Debug, Clone)]
pub struct AccessToken(pub String);

/// 校验令牌并将 `AuthContext` 与 `AccessToken` 写入请求扩展
pub async fn verify_token(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = extract_token(request.headers()) else {
        warn!(path = %request.uri().path(), "Missing access token");
        return Err(AppError::unauthenticated("Not logged in"));
    };

    let ctx = state.auth.authenticate(&token).await.inspect_err(|e| {
        warn!(path = %request.uri().path(), error = %e, "Token rejected");
    })?;

    debug!(user_id = %ctx.uid, "Token validated");
    request.extensions_mut().insert(ctx);
    request.extensions_mut().insert(AccessToken(token));

    Ok(next.run(request).await)
}

/// 当前登录用户，须在 `verify_token` 之后使用
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthContext);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| AppError::unauthenticated("Not logged in"))
    }
}

impl<S> FromRequestParts<S> for AccessToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AccessToken>()
            .cloned()
            .ok_or_else(|| AppError::unauthenticated("Not logged in"))
    }
}
