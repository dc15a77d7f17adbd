//! 图形验证码

mod svg;

pub use svg::{Captcha, CaptchaGenerator};
