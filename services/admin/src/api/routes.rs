//! 路由表

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};

use super::handlers::{auth, health, menu, role, user};
use super::middleware::verify_token;
use super::state::AppState;

pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/", get(health::index))
        .route("/api/getCode", get(auth::get_code))
        .route("/api/sendCodeEmail", post(auth::send_code_email))
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login));

    let protected = Router::new()
        .route("/api/logout", post(auth::logout))
        .route("/api/getUserInfo", get(auth::get_user_info))
        .route("/api/menu/current", get(menu::current))
        .route("/api/menu/list", get(menu::list))
        .route("/api/menu/tree", get(menu::tree))
        .route("/api/menu/create", post(menu::create))
        .route("/api/menu/update", post(menu::update))
        .route("/api/menu/delete", post(menu::delete))
        .route("/api/role/list", get(role::list))
        .route("/api/role/tree", get(role::tree))
        .route("/api/role/create", post(role::create))
        .route("/api/role/update", post(role::update))
        .route("/api/role/delete", post(role::delete))
        .route("/api/user/list", get(user::list))
        .route("/api/user/update", post(user::update))
        .route("/api/user/delete", post(user::delete))
        .route_layer(from_fn_with_state(state.clone(), verify_token));

    public.merge(protected).with_state(state)
}
