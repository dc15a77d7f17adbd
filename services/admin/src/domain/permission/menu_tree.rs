//! 菜单树构建

use std::collections::{HashMap, HashSet};

use console_common::{MenuId, ROOT_ID};

use crate::domain::menu::{Menu, MenuNode};

/// 按允许的菜单 ID 构建导航树
///
/// 从根哨兵 0 开始逐层挂载子节点，同级按 serialNum 降序（相同值保持输入顺序）。
/// 父节点不可达的菜单以及 id 为 0 的菜单被丢弃。
pub fn build_menu_tree(menus: &[Menu], allowed: &[MenuId]) -> Vec<MenuNode> {
    let allowed: HashSet<MenuId> = allowed.iter().copied().collect();
    assemble(menus.iter().filter(|m| allowed.contains(&m.id)))
}

/// 不做过滤的完整菜单树
pub fn build_full_menu_tree(menus: &[Menu]) -> Vec<MenuNode> {
    assemble(menus.iter())
}

fn assemble<'a>(menus: impl Iterator<Item = &'a Menu>) -> Vec<MenuNode> {
    let mut by_parent: HashMap<MenuId, Vec<&Menu>> = HashMap::new();
    for menu in menus.filter(|m| !m.id.is_root()) {
        by_parent.entry(menu.parent_id).or_default().push(menu);
    }
    for siblings in by_parent.values_mut() {
        siblings.sort_by(|a, b| b.serial_num.cmp(&a.serial_num));
    }

    let mut visited = HashSet::new();
    attach_children(MenuId(ROOT_ID), &by_parent, &mut visited)
}

fn attach_children(
    parent: MenuId,
    by_parent: &HashMap<MenuId, Vec<&Menu>>,
    visited: &mut HashSet<MenuId>,
) -> Vec<MenuNode> {
    let Some(siblings) = by_parent.get(&parent) else {
        return Vec::new();
    };

    let mut nodes = Vec::with_capacity(siblings.len());
    for menu in siblings {
        if !visited.insert(menu.id) {
            continue;
        }
        let mut node = MenuNode::from(*menu);
        node.children = attach_children(menu.id, by_parent, visited);
        nodes.push(node);
    }
    nodes
}
