//! 客户端会话标识
//!
//! 通过 `sid` cookie 或 `x-session-id` 请求头识别客户端；
//! 缺失或非法时生成新的标识并在响应中下发

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "sid";
pub const SESSION_HEADER: &str = "x-session-id";
const MAX_SID_LEN: usize = 64;

/// 读取指定名称的 cookie
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
}

fn is_valid_sid(sid: &str) -> bool {
    !sid.is_empty()
        && sid.len() <= MAX_SID_LEN
        && sid.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSession {
    pub id: String,
    /// 本次请求新建的会话
    pub is_new: bool,
}

impl ClientSession {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let existing = read_cookie(headers, SESSION_COOKIE)
            .or_else(|| headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok()))
            .map(str::trim)
            .filter(|sid| is_valid_sid(sid));

        match existing {
            Some(sid) => Self {
                id: sid.to_string(),
                is_new: false,
            },
            None => Self {
                id: Uuid::new_v4().simple().to_string(),
                is_new: true,
            },
        }
    }

    /// 新会话时在响应中写入 cookie 与请求头
    pub fn attach(&self, response: impl IntoResponse) -> Response {
        let mut response = response.into_response();
        if self.is_new {
            let cookie = format!(
                "{}={}; Path=/; HttpOnly; SameSite=Lax",
                SESSION_COOKIE, self.id
            );
            if let Ok(value) = HeaderValue::from_str(&cookie) {
                response.headers_mut().append(SET_COOKIE, value);
            }
            if let Ok(value) = HeaderValue::from_str(&self.id) {
                response.headers_mut().insert(SESSION_HEADER, value);
            }
        }
        response
    }
}

impl<S> FromRequestParts<S> for ClientSession
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}
