//! 角色接口

use axum::extract::State;
use console_common::{PagedResult, Pagination, RoleId};
use console_errors::{AppResult, Envelope};

use crate::api::dto::{IdRequest, RoleRequest, UpdateRoleRequest};
use crate::api::extract::{ApiQuery, ValidatedJson};
use crate::api::state::AppState;
use crate::domain::{Role, RoleNode};

pub async fn list(
    State(state): State<AppState>,
    ApiQuery(pagination): ApiQuery<Pagination>,
) -> AppResult<Envelope<PagedResult<Role>>> {
    Ok(Envelope::success("ok", state.roles.list(pagination).await?))
}

pub async fn tree(State(state): State<AppState>) -> AppResult<Envelope<Vec<RoleNode>>> {
    Ok(Envelope::success("ok", state.roles.tree().await?))
}

pub async fn create(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RoleRequest>,
) -> AppResult<Envelope<Role>> {
    let role = state.roles.create(req.into()).await?;
    Ok(Envelope::success("Role created", role))
}

pub async fn update(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<UpdateRoleRequest>,
) -> AppResult<Envelope<Role>> {
    let role = state.roles.update(RoleId(req.id), req.role.into()).await?;
    Ok(Envelope::success("Role updated", role))
}

pub async fn delete(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<IdRequest>,
) -> AppResult<Envelope<()>> {
    state.roles.delete(RoleId(req.id)).await?;
    Ok(Envelope::success("Role deleted", ()))
}
