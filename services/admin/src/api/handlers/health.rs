use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Banner {
    pub name: &'static str,
    pub version: &'static str,
}

/// 服务标识
pub async fn index() -> Json<Banner> {
    Json(Banner {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}
