//! 用户管理接口

use axum::extract::State;
use console_common::{PagedResult, Pagination, UserId};
use console_errors::{AppResult, Envelope};

use crate::api::dto::{IdRequest, UpdateUserRequest};
use crate::api::extract::{ApiQuery, ValidatedJson};
use crate::api::state::AppState;
use crate::application::UserView;

pub async fn list(
    State(state): State<AppState>,
    ApiQuery(pagination): ApiQuery<Pagination>,
) -> AppResult<Envelope<PagedResult<UserView>>> {
    Ok(Envelope::success("ok", state.users.list(pagination).await?))
}

pub async fn update(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<UpdateUserRequest>,
) -> AppResult<Envelope<UserView>> {
    let user = state.users.update(req.into()).await?;
    Ok(Envelope::success("User updated", user))
}

pub async fn delete(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<IdRequest>,
) -> AppResult<Envelope<()>> {
    state.users.delete(UserId(req.id)).await?;
    Ok(Envelope::success("User deleted", ()))
}
