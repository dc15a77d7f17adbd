//! 角色实体

use console_common::{MenuId, RoleId};
use serde::{Deserialize, Serialize};

/// 角色
///
/// `parent_id` 指向另一个角色，或为根哨兵 0
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: RoleId,
    pub parent_id: RoleId,
    pub name: String,
    pub description: String,
    pub menu_ids: Vec<MenuId>,
}

impl Role {
    pub fn new(
        id: RoleId,
        parent_id: RoleId,
        name: impl Into<String>,
        menu_ids: Vec<MenuId>,
    ) -> Self {
        Self {
            id,
            parent_id,
            name: name.into(),
            description: String::new(),
            menu_ids,
        }
    }

    /// 用草稿覆盖可编辑字段
    pub fn apply(&mut self, draft: RoleDraft) {
        self.parent_id = draft.parent_id;
        self.name = draft.name;
        self.description = draft.description;
        self.menu_ids = draft.menu_ids;
    }
}

/// 新建/更新角色时的可编辑字段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDraft {
    pub parent_id: RoleId,
    pub name: String,
    pub description: String,
    pub menu_ids: Vec<MenuId>,
}

impl RoleDraft {
    pub fn into_role(self, id: RoleId) -> Role {
        Role {
            id,
            parent_id: self.parent_id,
            name: self.name,
            description: self.description,
            menu_ids: self.menu_ids,
        }
    }
}

/// 角色树节点
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleNode {
    #[serde(flatten)]
    pub role: Role,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RoleNode>,
}
