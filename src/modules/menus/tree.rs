//! Flat menu rows to an ordered forest.
//!
//! Nodes live in an arena indexed by position; each node records the indices
//! of its children. A node whose parent is absent from the input is dropped
//! together with its subtree, so the result contains no orphans, and a cycle
//! can never be reached from a root.

use std::collections::HashMap;

use menuward_models::{MenuId, MenuSummary, MenuTreeNode};

struct MenuArena {
    nodes: Vec<Option<MenuTreeNode>>,
    children: Vec<Vec<usize>>,
    roots: Vec<usize>,
}

impl MenuArena {
    fn new(nodes: Vec<MenuTreeNode>) -> Self {
        let index: HashMap<MenuId, usize> =
            nodes.iter().enumerate().map(|(i, n)| (n.id, i)).collect();

        let mut children = vec![Vec::new(); nodes.len()];
        let mut roots = Vec::new();
        for (i, node) in nodes.iter().enumerate() {
            match node.parent_id {
                None => roots.push(i),
                Some(parent) => match index.get(&parent) {
                    Some(&p) if p != i => children[p].push(i),
                    _ => {}
                },
            }
        }

        let mut arena = Self {
            nodes: nodes.into_iter().map(Some).collect(),
            children,
            roots,
        };
        arena.sort_siblings();
        arena
    }

    fn sort_key(&self, i: usize) -> (i32, &str, MenuId) {
        match &self.nodes[i] {
            Some(n) => (n.sort_order, n.name.as_str(), n.id),
            None => (i32::MAX, "", MenuId::new(0)),
        }
    }

    fn sort_siblings(&mut self) {
        let mut roots = std::mem::take(&mut self.roots);
        roots.sort_by(|a, b| self.sort_key(*a).cmp(&self.sort_key(*b)));
        self.roots = roots;

        for i in 0..self.children.len() {
            let mut kids = std::mem::take(&mut self.children[i]);
            kids.sort_by(|a, b| self.sort_key(*a).cmp(&self.sort_key(*b)));
            self.children[i] = kids;
        }
    }

    fn take(&mut self, i: usize) -> Option<MenuTreeNode> {
        let mut node = self.nodes[i].take()?;
        let kids = std::mem::take(&mut self.children[i]);
        node.children = kids.into_iter().filter_map(|k| self.take(k)).collect();
        Some(node)
    }

    fn into_forest(mut self) -> Vec<MenuTreeNode> {
        let roots = std::mem::take(&mut self.roots);
        roots.into_iter().filter_map(|r| self.take(r)).collect()
    }
}

/// Builds the forest. Siblings are ordered by `(sort_order, name, id)` at every depth.
pub fn build_tree(nodes: Vec<MenuTreeNode>) -> Vec<MenuTreeNode> {
    MenuArena::new(nodes).into_forest()
}

/// Pre-order walk of the forest without actions or children.
pub fn flatten(tree: &[MenuTreeNode]) -> Vec<MenuSummary> {
    fn walk(nodes: &[MenuTreeNode], out: &mut Vec<MenuSummary>) {
        for node in nodes {
            out.push(MenuSummary {
                id: node.id,
                code: node.code.clone(),
                name: node.name.clone(),
                path: node.path.clone(),
                icon: node.icon.clone(),
                sort_order: node.sort_order,
                parent_id: node.parent_id,
            });
            walk(&node.children, out);
        }
    }

    let mut out = Vec::new();
    walk(tree, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: i64, parent: Option<i64>, sort_order: i32, name: &str) -> MenuTreeNode {
        MenuTreeNode {
            id: MenuId::new(id),
            code: format!("m{}", id),
            name: name.to_string(),
            path: None,
            icon: None,
            sort_order,
            parent_id: parent.map(MenuId::new),
            actions: vec![],
            children: vec![],
        }
    }

    fn ids(nodes: &[MenuTreeNode]) -> Vec<i64> {
        nodes.iter().map(|n| n.id.into_inner()).collect()
    }

    #[test]
    fn test_orders_roots_and_children() {
        let tree = build_tree(vec![
            node(1, None, 2, "Content"),
            node(2, None, 1, "Dashboard"),
            node(3, Some(1), 2, "Pages"),
            node(4, Some(1), 1, "Posts"),
            node(5, Some(1), 1, "Media"),
        ]);

        assert_eq!(ids(&tree), vec![2, 1]);
        assert_eq!(ids(&tree[1].children), vec![5, 4, 3]);
    }

    #[test]
    fn test_ties_broken_by_id() {
        let tree = build_tree(vec![node(9, None, 0, "Same"), node(3, None, 0, "Same")]);
        assert_eq!(ids(&tree), vec![3, 9]);
    }

    #[test]
    fn test_orphan_subtree_is_dropped() {
        let tree = build_tree(vec![
            node(1, None, 0, "Root"),
            node(2, Some(42), 0, "Orphan"),
            node(3, Some(2), 0, "Orphan child"),
        ]);
        assert_eq!(ids(&tree), vec![1]);
        assert_eq!(flatten(&tree).len(), 1);
    }

    #[test]
    fn test_cycle_is_unreachable() {
        let tree = build_tree(vec![
            node(1, Some(2), 0, "A"),
            node(2, Some(1), 0, "B"),
            node(3, Some(3), 0, "Self"),
        ]);
        assert!(tree.is_empty());
    }

    #[test]
    fn test_deep_ordering_and_flatten() {
        let tree = build_tree(vec![
            node(1, None, 0, "Root"),
            node(2, Some(1), 0, "Child"),
            node(4, Some(2), 2, "Grandchild B"),
            node(3, Some(2), 1, "Grandchild A"),
        ]);
        assert_eq!(ids(&tree[0].children[0].children), vec![3, 4]);

        let flat: Vec<i64> = flatten(&tree).iter().map(|m| m.id.into_inner()).collect();
        assert_eq!(flat, vec![1, 2, 3, 4]);
    }
}
