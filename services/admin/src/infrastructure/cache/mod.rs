//! 基于 CachePort 的会话与令牌存储

mod session_store;
mod token_store;

pub use session_store::{EmailCode, SessionStore};
pub use token_store::TokenStore;
