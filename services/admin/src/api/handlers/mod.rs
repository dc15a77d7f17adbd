//! 请求处理函数

pub mod auth;
pub mod health;
pub mod menu;
pub mod role;
pub mod user;
