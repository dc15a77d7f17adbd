//! HTTP 接口层

pub mod dto;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod session;
pub mod state;

pub use routes::router;
pub use state::{AppDependencies, AppState};
