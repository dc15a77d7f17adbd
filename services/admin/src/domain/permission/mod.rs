//! 权限树解析
//!
//! 角色继承链 → 有序去重的菜单 ID → 按 serialNum 排序的嵌套菜单树。
//! 全部为纯函数，每次请求基于当次读取的快照计算，不保留任何状态。

mod lineage;
mod menu_tree;

pub use lineage::{build_role_tree, collect_role_lineage, resolve_user_menu_ids};
pub use menu_tree::{build_full_menu_tree, build_menu_tree};
