use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::TreeError;

/// Deepest path (in segments) a tree accepts. Bounds every recursive walk.
pub const MAX_DEPTH: usize = 256;

/// Index into [`Tree::nodes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct NodeId(pub u64);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One weighted input row, as produced by a parser or a scanner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub path: String,
    pub size: f64,
    pub heat: Option<f64>,
}

impl Record {
    pub fn new(path: impl Into<String>, size: f64) -> Self {
        Self {
            path: path.into(),
            size,
            heat: None,
        }
    }

    pub fn with_heat(mut self, heat: f64) -> Self {
        self.heat = Some(heat);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Node {
    pub path: String,
    /// Display name. Last path segment unless overridden.
    pub name: String,
    pub size: f64,
    pub heat: f64,
    /// Distinguishes "no heat data" from a heat of zero.
    pub has_heat: bool,
    /// Inferred from a path prefix, never supplied as a record.
    pub is_virtual: bool,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl Node {
    fn virtual_at(path: &str, parent: Option<NodeId>, delimiter: char) -> Self {
        Self {
            path: path.to_string(),
            name: last_segment(path, delimiter).to_string(),
            is_virtual: true,
            parent,
            ..Self::default()
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

fn last_segment(path: &str, delimiter: char) -> &str {
    path.rsplit(delimiter).next().unwrap_or(path)
}

/// Path-derived hierarchy stored as a flat arena.
///
/// Built once by [`TreeBuilder`], then mutated in place by the imputers and the
/// heat normalizer, and read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Tree {
    pub root: NodeId,
    pub nodes: Vec<Node>,
    pub delimiter: char,
    index: HashMap<String, NodeId>,
}

impl Tree {
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Looks up a node by its full path. The synthesized multi-root node is not addressable.
    pub fn find(&self, path: &str) -> Option<NodeId> {
        self.index.get(path).copied()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ids reachable from the root, children before parents.
    pub fn post_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![(self.root, false)];
        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                order.push(id);
                continue;
            }
            stack.push((id, true));
            for &child in self.children(id).iter().rev() {
                stack.push((child, false));
            }
        }
        order
    }

    /// Weight of a node for layout: its own size when it was supplied as a record,
    /// otherwise the sum over its descendants.
    pub fn effective_size(&self, id: NodeId) -> f64 {
        let node = self.get(id);
        if !node.is_virtual {
            return node.size;
        }
        node.children
            .iter()
            .map(|&child| self.effective_size(child))
            .sum()
    }

    /// Resets every display name to the last segment of its path.
    pub fn set_names_from_paths(&mut self) {
        let delimiter = self.delimiter;
        for node in &mut self.nodes {
            node.name = last_segment(&node.path, delimiter).to_string();
        }
    }

    /// Moves the root down past single-child chains and names the new root by its full path.
    pub fn collapse_root(&mut self) {
        let mut q = self.root;
        while let [only] = self.children(q) {
            q = *only;
        }
        self.root = q;
        let node = self.get_mut(q);
        node.parent = None;
        node.name = node.path.clone();
    }

    fn ensure_one(&mut self, prefix: &str, parent: Option<NodeId>, roots: &mut Vec<NodeId>) -> NodeId {
        if let Some(id) = self.find(prefix) {
            return id;
        }
        let id = NodeId(self.nodes.len() as u64);
        self.nodes
            .push(Node::virtual_at(prefix, parent, self.delimiter));
        self.index.insert(prefix.to_string(), id);
        match parent {
            Some(p) => self.get_mut(p).children.push(id),
            None => roots.push(id),
        }
        id
    }

    /// Makes sure `path` and all of its prefixes exist, linking each to its parent.
    fn ensure_path(&mut self, path: &str, roots: &mut Vec<NodeId>) -> NodeId {
        let mut cuts = path
            .match_indices(self.delimiter)
            .map(|(i, _)| i)
            .chain(std::iter::once(path.len()));
        let first = cuts.next().unwrap_or(path.len());
        let mut id = self.ensure_one(&path[..first], None, roots);
        for end in cuts {
            id = self.ensure_one(&path[..end], Some(id), roots);
        }
        id
    }
}

/// Assembles a [`Tree`] from flat records, synthesizing virtual intermediate nodes.
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    delimiter: char,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self { delimiter: '/' }
    }
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn build<I>(&self, records: I) -> Result<Tree, TreeError>
    where
        I: IntoIterator<Item = Record>,
    {
        let mut tree = Tree {
            delimiter: self.delimiter,
            ..Tree::default()
        };
        let mut roots = Vec::new();

        for record in records {
            let depth = record.path.matches(self.delimiter).count() + 1;
            if depth > MAX_DEPTH {
                return Err(TreeError::TooDeep {
                    path: record.path,
                    depth,
                    limit: MAX_DEPTH,
                });
            }

            let id = tree.ensure_path(&record.path, &mut roots);
            let node = tree.get_mut(id);
            if !node.is_virtual {
                return Err(TreeError::DuplicatePath(record.path));
            }
            node.is_virtual = false;
            node.size = record.size;
            node.heat = record.heat.unwrap_or_default();
            node.has_heat = record.heat.is_some();
        }

        tree.root = match roots.as_slice() {
            [] => return Err(TreeError::NoRoot),
            [only] => *only,
            _ => {
                let id = NodeId(tree.nodes.len() as u64);
                for &r in &roots {
                    tree.get_mut(r).parent = Some(id);
                }
                tree.nodes.push(Node {
                    is_virtual: true,
                    children: roots.clone(),
                    ..Node::default()
                });
                id
            }
        };

        tracing::info!(
            nodes = tree.nodes.len(),
            roots = roots.len(),
            "built tree"
        );
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(tree: &Tree, ids: &[NodeId]) -> Vec<String> {
        ids.iter().map(|&id| tree.get(id).path.clone()).collect()
    }

    #[test]
    fn virtual_prefixes_are_synthesized() {
        let tree = TreeBuilder::new()
            .build(vec![Record::new("a/b/c", 3.0)])
            .unwrap();

        assert_eq!(tree.get(tree.root).path, "a");
        let a = tree.find("a").unwrap();
        let b = tree.find("a/b").unwrap();
        let c = tree.find("a/b/c").unwrap();
        assert!(tree.get(a).is_virtual);
        assert!(tree.get(b).is_virtual);
        assert!(!tree.get(c).is_virtual);
        assert_eq!(tree.get(b).size, 0.0);
        assert!(!tree.get(b).has_heat);
        assert_eq!(tree.children(a), &[b]);
        assert_eq!(tree.children(b), &[c]);
        assert_eq!(tree.get(c).parent, Some(b));
        assert_eq!(tree.get(c).name, "c");
    }

    #[test]
    fn shared_prefix_keeps_first_appearance_order() {
        let tree = TreeBuilder::new()
            .build(vec![
                Record::new("a/b/c", 1.0),
                Record::new("a/b/c/d", 1.0),
                Record::new("a/b/d", 1.0),
            ])
            .unwrap();

        let b = tree.find("a/b").unwrap();
        assert_eq!(paths(&tree, tree.children(b)), vec!["a/b/c", "a/b/d"]);
        let c = tree.find("a/b/c").unwrap();
        assert_eq!(paths(&tree, tree.children(c)), vec!["a/b/c/d"]);
    }

    #[test]
    fn record_for_existing_prefix_becomes_concrete() {
        let tree = TreeBuilder::new()
            .build(vec![Record::new("a/b", 2.0), Record::new("a", 7.0).with_heat(3.0)])
            .unwrap();

        let a = tree.get(tree.root);
        assert!(!a.is_virtual);
        assert_eq!(a.size, 7.0);
        assert!(a.has_heat);
        assert_eq!(a.heat, 3.0);
    }

    #[test]
    fn leading_delimiter_gives_empty_root() {
        let tree = TreeBuilder::new()
            .build(vec![Record::new("/a/b/c", 1.0)])
            .unwrap();

        assert_eq!(tree.get(tree.root).path, "");
        assert_eq!(paths(&tree, tree.children(tree.root)), vec!["/a"]);
    }

    #[test]
    fn no_records_is_no_root() {
        let err = TreeBuilder::new().build(Vec::new()).unwrap_err();
        assert_eq!(err, TreeError::NoRoot);
        assert!(err.to_string().contains("cycle"));
    }

    #[test]
    fn several_roots_get_anonymous_parent() {
        let tree = TreeBuilder::new()
            .build(vec![Record::new("a/b", 1.0), Record::new("b/d", 1.0)])
            .unwrap();

        let root = tree.get(tree.root);
        assert!(root.is_virtual);
        assert_eq!(root.name, "");
        assert_eq!(paths(&tree, &root.children), vec!["a", "b"]);
        assert_eq!(tree.get(tree.find("a").unwrap()).parent, Some(tree.root));
    }

    #[test]
    fn duplicate_path_is_rejected() {
        let err = TreeBuilder::new()
            .build(vec![Record::new("a/b", 1.0), Record::new("a/b", 2.0)])
            .unwrap_err();
        assert_eq!(err, TreeError::DuplicatePath("a/b".to_string()));
    }

    #[test]
    fn overly_deep_path_is_rejected() {
        let path = vec!["x"; MAX_DEPTH + 1].join("/");
        let err = TreeBuilder::new()
            .build(vec![Record::new(path, 1.0)])
            .unwrap_err();
        assert!(matches!(err, TreeError::TooDeep { depth, .. } if depth == MAX_DEPTH + 1));
    }

    #[test]
    fn custom_delimiter() {
        let tree = TreeBuilder::new()
            .delimiter('.')
            .build(vec![Record::new("com.example.app", 1.0)])
            .unwrap();

        assert_eq!(tree.get(tree.root).path, "com");
        assert_eq!(tree.get(tree.find("com.example.app").unwrap()).name, "app");
    }

    #[test]
    fn post_order_visits_children_first() {
        let tree = TreeBuilder::new()
            .build(vec![Record::new("a/b/c", 1.0), Record::new("a/d", 1.0)])
            .unwrap();

        let order = paths(&tree, &tree.post_order());
        assert_eq!(order, vec!["a/b/c", "a/b", "a/d", "a"]);
    }

    #[test]
    fn effective_size_sums_virtual_nodes_only() {
        let tree = TreeBuilder::new()
            .build(vec![
                Record::new("a/b/c", 2.0),
                Record::new("a/b/d", 3.0),
                Record::new("a/e", 10.0),
                Record::new("a/e/f", 1.0),
            ])
            .unwrap();

        assert_eq!(tree.effective_size(tree.find("a/b").unwrap()), 5.0);
        assert_eq!(tree.effective_size(tree.find("a/e").unwrap()), 10.0);
        assert_eq!(tree.effective_size(tree.root), 15.0);
    }

    #[test]
    fn collapse_root_skips_single_child_chain() {
        let mut tree = TreeBuilder::new()
            .build(vec![Record::new("a/b/c", 1.0), Record::new("a/b/d", 1.0)])
            .unwrap();

        tree.collapse_root();
        let root = tree.get(tree.root);
        assert_eq!(root.path, "a/b");
        assert_eq!(root.name, "a/b");
        assert_eq!(root.parent, None);

        tree.set_names_from_paths();
        assert_eq!(tree.get(tree.root).name, "b");
    }
}
