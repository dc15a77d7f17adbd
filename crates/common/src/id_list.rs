//! 逗号分隔的 ID 列表
//!
//! 存储层以 `"1,2,3"` 形式保存角色/菜单 ID 列表，领域层使用有序的 `Vec<Id>`。
//! 空白段会被忽略（兼容历史数据中的尾随逗号），非数字或负数段视为非法。

use std::fmt::Display;

use thiserror::Error;

/// ID 列表解析错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid id token '{token}' at position {position}")]
pub struct IdListError {
    pub token: String,
    pub position: usize,
}

/// 解析逗号分隔的 ID 列表，保持原有顺序
pub fn parse_id_list<T: From<i64>>(raw: &str) -> Result<Vec<T>, IdListError> {
    let mut ids = Vec::new();

    for (position, segment) in raw.split(',').enumerate() {
        let token = segment.trim();
        if token.is_empty() {
            continue;
        }

        let value = token
            .parse::<i64>()
            .ok()
            .filter(|v| *v >= 0)
            .ok_or_else(|| IdListError {
                token: token.to_string(),
                position,
            })?;

        ids.push(T::from(value));
    }

    Ok(ids)
}

/// 将 ID 列表编码为逗号分隔字符串
pub fn join_id_list<T: Display>(ids: &[T]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
