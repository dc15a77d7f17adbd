//! 菜单接口

use axum::extract::State;
use console_common::{MenuId, PagedResult, Pagination};
use console_errors::{AppResult, Envelope};

use crate::api::dto::{IdRequest, MenuRequest, UpdateMenuRequest};
use crate::api::extract::{ApiQuery, ValidatedJson};
use crate::api::middleware::CurrentUser;
use crate::api::state::AppState;
use crate::domain::{Menu, MenuNode};

/// GET /api/menu/current
pub async fn current(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
) -> AppResult<Envelope<Vec<MenuNode>>> {
    let tree = state.menus.current(&ctx).await?;
    Ok(Envelope::success("Menu loaded", tree))
}

pub async fn list(
    State(state): State<AppState>,
    ApiQuery(pagination): ApiQuery<Pagination>,
) -> AppResult<Envelope<PagedResult<Menu>>> {
    Ok(Envelope::success("ok", state.menus.list(pagination).await?))
}

pub async fn tree(State(state): State<AppState>) -> AppResult<Envelope<Vec<MenuNode>>> {
    Ok(Envelope::success("ok", state.menus.tree().await?))
}

pub async fn create(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<MenuRequest>,
) -> AppResult<Envelope<Menu>> {
    let menu = state.menus.create(req.into()).await?;
    Ok(Envelope::success("Menu created", menu))
}

pub async fn update(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<UpdateMenuRequest>,
) -> AppResult<Envelope<Menu>> {
    let menu = state.menus.update(MenuId(req.id), req.menu.into()).await?;
    Ok(Envelope::success("Menu updated", menu))
}

pub async fn delete(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<IdRequest>,
) -> AppResult<Envelope<()>> {
    state.menus.delete(MenuId(req.id)).await?;
    Ok(Envelope::success("Menu deleted", ()))
}
