//! parent_id 层级校验

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// 从 `start` 沿父链向上是否能到达 `target`（包含 `start` 自身）
///
/// 父链中已存在的环会在重复访问时终止
pub fn reaches<K>(parents: &HashMap<K, K>, start: K, target: K) -> bool
where
    K: Copy + Eq + Hash,
{
    let mut visited = HashSet::new();
    let mut current = start;

    while visited.insert(current) {
        if current == target {
            return true;
        }
        match parents.get(&current) {
            Some(&parent) => current = parent,
            None => return false,
        }
    }

    false
}

/// 将 `node` 挂到 `new_parent` 下是否会成环
pub fn would_create_cycle<K>(parents: &HashMap<K, K>, node: K, new_parent: K) -> bool
where
    K: Copy + Eq + Hash,
{
    reaches(parents, new_parent, node)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> HashMap<i64, i64> {
        // 3 -> 2 -> 1 -> 0
        HashMap::from([(1, 0), (2, 1), (3, 2)])
    }

    #[test]
    fn test_reaches_ancestor() {
        let parents = chain();
        assert!(reaches(&parents, 3, 1));
        assert!(reaches(&parents, 3, 3));
        assert!(!reaches(&parents, 1, 3));
    }

    #[test]
    fn test_cycle_detection() {
        let parents = chain();
        assert!(would_create_cycle(&parents, 1, 3));
        assert!(would_create_cycle(&parents, 2, 2));
        assert!(!would_create_cycle(&parents, 3, 1));
        assert!(!would_create_cycle(&parents, 1, 0));
    }

    #[test]
    fn test_existing_cycle_terminates() {
        let parents = HashMap::from([(1, 2), (2, 1)]);
        assert!(!reaches(&parents, 1, 9));
    }
}
