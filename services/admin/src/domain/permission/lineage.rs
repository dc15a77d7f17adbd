//! 角色继承链

use std::collections::{HashMap, HashSet};

use console_common::{MenuId, RoleId, parse_id_list};
use console_errors::{AppError, AppResult};

use crate::domain::role::{Role, RoleNode};

fn index_roles(roles: &[Role]) -> HashMap<RoleId, &Role> {
    let mut index = HashMap::with_capacity(roles.len());
    for role in roles {
        index.entry(role.id).or_insert(role);
    }
    index
}

fn walk_lineage<'a>(
    index: &HashMap<RoleId, &'a Role>,
    role_id: RoleId,
) -> AppResult<Vec<&'a Role>> {
    let mut lineage = Vec::new();
    let mut visited = HashSet::new();
    let mut current = role_id;

    while !current.is_root() {
        let Some(role) = index.get(&current) else {
            break;
        };
        if !visited.insert(current) {
            return Err(AppError::validation(format!(
                "Role hierarchy cycle detected at role {}",
                current
            )));
        }
        lineage.push(*role);
        current = role.parent_id;
    }

    Ok(lineage)
}

/// 收集角色及其全部祖先，起始角色在前
///
/// 找不到的角色或根哨兵使链条结束；父链成环时返回校验错误
pub fn collect_role_lineage(roles: &[Role], role_id: RoleId) -> AppResult<Vec<&Role>> {
    walk_lineage(&index_roles(roles), role_id)
}

/// 解析用户可访问的菜单 ID
///
/// `role_csv` 中每个角色的继承链合并为一个集合（按发现顺序去重），
/// 再从集合内的根开始先序遍历，按首次出现顺序合并菜单 ID。
pub fn resolve_user_menu_ids(roles: &[Role], role_csv: &str) -> AppResult<Vec<MenuId>> {
    let role_ids: Vec<RoleId> = parse_id_list(role_csv)
        .map_err(|e| AppError::validation(format!("Invalid role id list: {}", e)))?;

    let index = index_roles(roles);

    let mut lineage_set: Vec<&Role> = Vec::new();
    let mut seen = HashSet::new();
    for role_id in role_ids {
        for role in walk_lineage(&index, role_id)? {
            if seen.insert(role.id) {
                lineage_set.push(role);
            }
        }
    }

    let mut roots = Vec::new();
    let mut children: HashMap<RoleId, Vec<&Role>> = HashMap::new();
    for role in &lineage_set {
        if role.parent_id.is_root() || !seen.contains(&role.parent_id) {
            roots.push(*role);
        } else {
            children.entry(role.parent_id).or_default().push(*role);
        }
    }

    let mut menu_ids = Vec::new();
    let mut seen_menus = HashSet::new();
    let mut stack: Vec<&Role> = roots.into_iter().rev().collect();
    let mut visited = HashSet::new();

    while let Some(role) = stack.pop() {
        if !visited.insert(role.id) {
            continue;
        }
        for menu_id in &role.menu_ids {
            if seen_menus.insert(*menu_id) {
                menu_ids.push(*menu_id);
            }
        }
        if let Some(kids) = children.get(&role.id) {
            stack.extend(kids.iter().rev());
        }
    }

    Ok(menu_ids)
}

/// 构建完整角色树
///
/// 父角色为根哨兵或不存在的角色作为顶层节点，同级保持输入顺序
pub fn build_role_tree(roles: &[Role]) -> Vec<RoleNode> {
    let index = index_roles(roles);
    let mut children: HashMap<RoleId, Vec<&Role>> = HashMap::new();
    let mut roots = Vec::new();

    for role in roles {
        if role.parent_id.is_root() || !index.contains_key(&role.parent_id) {
            roots.push(role);
        } else {
            children.entry(role.parent_id).or_default().push(role);
        }
    }

    let mut visited = HashSet::new();
    roots
        .into_iter()
        .filter_map(|role| attach_role(role, &children, &mut visited))
        .collect()
}

fn attach_role(
    role: &Role,
    children: &HashMap<RoleId, Vec<&Role>>,
    visited: &mut HashSet<RoleId>,
) -> Option<RoleNode> {
    if !visited.insert(role.id) {
        return None;
    }
    let kids = children
        .get(&role.id)
        .map(|kids| {
            kids.iter()
                .filter_map(|kid| attach_role(kid, children, visited))
                .collect()
        })
        .unwrap_or_default();

    Some(RoleNode {
        role: role.clone(),
        children: kids,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(id: i64, parent: i64, menus: &[i64]) -> Role {
        Role::new(
            RoleId(id),
            RoleId(parent),
            format!("role-{}", id),
            menus.iter().copied().map(MenuId).collect(),
        )
    }

    fn ids(roles: &[&Role]) -> Vec<i64> {
        roles.iter().map(|r| r.id.0).collect()
    }

    fn menu_ids(values: &[i64]) -> Vec<MenuId> {
        values.iter().copied().map(MenuId).collect()
    }

    #[test]
    fn test_lineage_starts_with_role_then_ancestors() {
        let roles = vec![role(1, 0, &[]), role(2, 1, &[]), role(3, 2, &[])];
        let lineage = collect_role_lineage(&roles, RoleId(3)).unwrap();
        assert_eq!(ids(&lineage), vec![3, 2, 1]);
    }

    #[test]
    fn test_lineage_unknown_role_is_empty() {
        let roles = vec![role(1, 0, &[])];
        assert!(collect_role_lineage(&roles, RoleId(99)).unwrap().is_empty());
        assert!(collect_role_lineage(&roles, RoleId(0)).unwrap().is_empty());
    }

    #[test]
    fn test_lineage_stops_at_dangling_parent() {
        let roles = vec![role(5, 42, &[])];
        let lineage = collect_role_lineage(&roles, RoleId(5)).unwrap();
        assert_eq!(ids(&lineage), vec![5]);
    }

    #[test]
    fn test_lineage_cycle_is_rejected() {
        let roles = vec![role(1, 2, &[]), role(2, 1, &[])];
        let err = collect_role_lineage(&roles, RoleId(1)).unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m.contains("cycle detected")));

        let self_loop = vec![role(7, 7, &[])];
        assert!(collect_role_lineage(&self_loop, RoleId(7)).is_err());
    }

    #[test]
    fn test_resolve_parent_menus_first() {
        let roles = vec![role(1, 0, &[10, 20]), role(2, 1, &[20, 30])];
        let resolved = resolve_user_menu_ids(&roles, "2").unwrap();
        assert_eq!(resolved, menu_ids(&[10, 20, 30]));
    }

    #[test]
    fn test_resolve_empty_csv() {
        let roles = vec![role(1, 0, &[10])];
        assert!(resolve_user_menu_ids(&roles, "").unwrap().is_empty());
    }

    #[test]
    fn test_resolve_unknown_role_contributes_nothing() {
        let roles = vec![role(1, 0, &[10])];
        assert_eq!(
            resolve_user_menu_ids(&roles, "99,1").unwrap(),
            menu_ids(&[10])
        );
    }

    #[test]
    fn test_resolve_malformed_csv() {
        let roles = vec![role(1, 0, &[10])];
        let err = resolve_user_menu_ids(&roles, "1,x").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_resolve_union_without_duplicates() {
        // 1 ─┬─ 2
        //    └─ 3     4 (独立根)
        let roles = vec![
            role(1, 0, &[1, 2]),
            role(2, 1, &[2, 3]),
            role(3, 1, &[3, 4]),
            role(4, 0, &[9, 1]),
        ];
        let resolved = resolve_user_menu_ids(&roles, "3,2,4").unwrap();
        // 根按发现顺序：1（经由 3），然后 4；1 的子节点按发现顺序：3、2
        assert_eq!(resolved, menu_ids(&[1, 2, 3, 4, 9]));

        let again = resolve_user_menu_ids(&roles, "3,2,4").unwrap();
        assert_eq!(resolved, again);
    }

    #[test]
    fn test_resolve_cycle_propagates() {
        let roles = vec![role(1, 2, &[1]), role(2, 1, &[2])];
        assert!(resolve_user_menu_ids(&roles, "1").is_err());
    }

    #[test]
    fn test_role_tree() {
        let roles = vec![
            role(1, 0, &[]),
            role(2, 1, &[]),
            role(3, 1, &[]),
            role(4, 77, &[]),
        ];
        let tree = build_role_tree(&roles);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].role.id, RoleId(1));
        let kids: Vec<i64> = tree[0].children.iter().map(|n| n.role.id.0).collect();
        assert_eq!(kids, vec![2, 3]);
        assert_eq!(tree[1].role.id, RoleId(4));
    }
}
