//! 注册、登录、验证码

use axum::extract::State;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::response::Response;
use console_errors::{AppResult, Envelope};
use serde::Serialize;

use crate::api::dto::{LoginRequest, RegisterRequest, SendCodeEmailRequest};
use crate::api::extract::ValidatedJson;
use crate::api::middleware::{AccessToken, CurrentUser};
use crate::api::session::ClientSession;
use crate::api::state::AppState;
use crate::application::UserInfo;

/// GET /api/getCode
pub async fn get_code(State(state): State<AppState>, session: ClientSession) -> AppResult<Response> {
    let captcha = state.auth.issue_captcha(&session.id).await?;
    Ok(session.attach((
        [(CONTENT_TYPE, "image/svg+xml"), (CACHE_CONTROL, "no-store")],
        captcha.svg,
    )))
}

/// POST /api/sendCodeEmail
pub async fn send_code_email(
    State(state): State<AppState>,
    session: ClientSession,
    ValidatedJson(req): ValidatedJson<SendCodeEmailRequest>,
) -> AppResult<Response> {
    state.auth.send_email_code(&session.id, req.into()).await?;
    Ok(session.attach(Envelope::success("Verification email sent", ())))
}

#[derive(Debug, Serialize)]
pub struct Registered {
    pub id: i64,
}

/// POST /api/register
pub async fn register(
    State(state): State<AppState>,
    session: ClientSession,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> AppResult<Response> {
    let id = state.auth.register(&session.id, req.into()).await?;
    Ok(session.attach(Envelope::success(
        "Registration successful",
        Registered { id: id.0 },
    )))
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    session: ClientSession,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> AppResult<Response> {
    let result = state.auth.login(&session.id, req.into()).await?;
    Ok(session.attach(Envelope::success("Login successful", result)))
}

/// POST /api/logout
pub async fn logout(
    State(state): State<AppState>,
    AccessToken(token): AccessToken,
) -> AppResult<Envelope<()>> {
    state.auth.logout(&token).await?;
    Ok(Envelope::success("Logged out", ()))
}

#[derive(Debug, Serialize)]
pub struct UserInfoResponse {
    pub user: UserInfo,
}

/// GET /api/getUserInfo
pub async fn get_user_info(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
) -> AppResult<Envelope<UserInfoResponse>> {
    let user = state.users.get_user_info(ctx.uid).await?;
    Ok(Envelope::success("User info loaded", UserInfoResponse { user }))
}
