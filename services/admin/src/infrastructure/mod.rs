//! 基础设施层

pub mod cache;
pub mod captcha;
pub mod persistence;
