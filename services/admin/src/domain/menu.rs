//! 菜单实体与前端导航节点

use console_common::MenuId;
use serde::{Deserialize, Serialize};

/// 菜单
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Menu {
    pub id: MenuId,
    pub parent_id: MenuId,
    pub name: String,
    pub title: String,
    pub icon: String,
    pub show: bool,
    pub component: String,
    pub redirect: String,
    pub path: String,
    pub hide_children: bool,
    /// 同级排序键，大者在前
    pub serial_num: i32,
    pub permission: String,
    #[serde(rename = "type")]
    pub menu_type: String,
}

impl Menu {
    /// 仅含必要字段的菜单，其余取默认值
    pub fn new(id: MenuId, parent_id: MenuId, name: impl Into<String>, serial_num: i32) -> Self {
        let name = name.into();
        Self {
            id,
            parent_id,
            title: name.clone(),
            name,
            icon: String::new(),
            show: true,
            component: String::new(),
            redirect: String::new(),
            path: String::new(),
            hide_children: false,
            serial_num,
            permission: String::new(),
            menu_type: String::new(),
        }
    }

    pub fn apply(&mut self, draft: MenuDraft) {
        let id = self.id;
        *self = draft.into_menu(id);
    }
}

/// 新建/更新菜单时的可编辑字段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuDraft {
    pub parent_id: MenuId,
    pub name: String,
    pub title: String,
    pub icon: String,
    pub show: bool,
    pub component: String,
    pub redirect: String,
    pub path: String,
    pub hide_children: bool,
    pub serial_num: i32,
    pub permission: String,
    pub menu_type: String,
}

impl MenuDraft {
    pub fn into_menu(self, id: MenuId) -> Menu {
        Menu {
            id,
            parent_id: self.parent_id,
            name: self.name,
            title: self.title,
            icon: self.icon,
            show: self.show,
            component: self.component,
            redirect: self.redirect,
            path: self.path,
            hide_children: self.hide_children,
            serial_num: self.serial_num,
            permission: self.permission,
            menu_type: self.menu_type,
        }
    }
}

/// 菜单展示属性
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuMeta {
    pub icon: String,
    pub title: String,
    pub show: bool,
    pub hide_children: bool,
}

/// 前端导航树节点
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuNode {
    pub name: String,
    pub parent_id: MenuId,
    pub id: MenuId,
    pub meta: MenuMeta,
    pub component: String,
    pub redirect: String,
    pub path: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuNode>,
    pub serial_num: i32,
    pub permission: String,
    #[serde(rename = "type")]
    pub menu_type: String,
}

impl From<&Menu> for MenuNode {
    fn from(menu: &Menu) -> Self {
        Self {
            name: menu.name.clone(),
            parent_id: menu.parent_id,
            id: menu.id,
            meta: MenuMeta {
                icon: menu.icon.clone(),
                title: menu.title.clone(),
                show: menu.show,
                hide_children: menu.hide_children,
            },
            component: menu.component.clone(),
            redirect: menu.redirect.clone(),
            path: menu.path.clone(),
            children: Vec::new(),
            serial_num: menu.serial_num,
            permission: menu.permission.clone(),
            menu_type: menu.menu_type.clone(),
        }
    }
}
