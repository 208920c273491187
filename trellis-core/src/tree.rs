//! Generic ownership tree for downstream node builders.
//!
//! The tree uses an index-based arena: the [`Tree`] owns every node in one
//! `Vec`, children are ordered lists of [`NodeId`]s, and the parent link is
//! a non-owning back-reference. This gives parent pointers without
//! reference cycles or interior mutability.
//!
//! Nodes are created detached with [`Tree::insert`] and attached exactly
//! once with [`Tree::add_child`] - the single mutation entry point. Nothing
//! is ever reparented or detached, so no runtime cycle check is needed.

/// Index into a tree's node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn new(index: usize) -> Self {
        NodeId(index as u32)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug)]
struct NodeData<T> {
    value: T,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An arena-backed tree of `T` values.
#[derive(Debug, Default)]
pub struct Tree<T> {
    nodes: Vec<NodeData<T>>,
}

impl<T> Tree<T> {
    /// Create an empty tree.
    pub fn new() -> Self {
        Tree { nodes: Vec::new() }
    }

    /// Number of nodes in the arena, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Create a detached node holding `value`.
    pub fn insert(&mut self, value: T) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(NodeData {
            value,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Attach a detached node as the last child of `parent`.
    ///
    /// This is the only structural mutation. A node is attached at most
    /// once and never moved afterwards; attaching a node to itself or to
    /// one of its descendants is a caller bug and is not checked beyond
    /// the attach-once assertion.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(
            self.nodes[child.index()].parent.is_none(),
            "node attached twice"
        );
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(child);
    }

    /// The value held by a node.
    pub fn get(&self, id: NodeId) -> &T {
        &self.nodes[id.index()].value
    }

    /// Mutable access to the value held by a node.
    pub fn get_mut(&mut self, id: NodeId) -> &mut T {
        &mut self.nodes[id.index()].value
    }

    /// The parent of a node; `None` for roots.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    /// The ordered children of a node.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    /// The sibling immediately before this node under its parent.
    pub fn left_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|&sibling| sibling == id)?;
        if pos > 0 {
            Some(siblings[pos - 1])
        } else {
            None
        }
    }

    /// The sibling immediately after this node under its parent.
    pub fn right_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|&sibling| sibling == id)?;
        siblings.get(pos + 1).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detached_insert() {
        let mut tree: Tree<&str> = Tree::new();
        let node = tree.insert("root");
        assert_eq!(tree.parent(node), None);
        assert!(tree.children(node).is_empty());
        assert_eq!(*tree.get(node), "root");
    }

    #[test]
    fn test_add_child_links_both_ways() {
        let mut tree = Tree::new();
        let root = tree.insert("root");
        let child = tree.insert("child");
        tree.add_child(root, child);

        assert_eq!(tree.parent(child), Some(root));
        assert_eq!(tree.children(root), &[child]);
    }

    #[test]
    fn test_children_keep_insertion_order() {
        let mut tree = Tree::new();
        let root = tree.insert(0);
        let ids: Vec<_> = (1..=3)
            .map(|n| {
                let id = tree.insert(n);
                tree.add_child(root, id);
                id
            })
            .collect();
        assert_eq!(tree.children(root), ids.as_slice());
    }

    #[test]
    fn test_siblings() {
        let mut tree = Tree::new();
        let root = tree.insert("root");
        let a = tree.insert("a");
        let b = tree.insert("b");
        let c = tree.insert("c");
        for id in [a, b, c] {
            tree.add_child(root, id);
        }

        assert_eq!(tree.left_sibling(a), None);
        assert_eq!(tree.right_sibling(a), Some(b));
        assert_eq!(tree.left_sibling(b), Some(a));
        assert_eq!(tree.right_sibling(b), Some(c));
        assert_eq!(tree.right_sibling(c), None);

        // roots have no siblings
        assert_eq!(tree.left_sibling(root), None);
        assert_eq!(tree.right_sibling(root), None);
    }

    #[test]
    fn test_get_mut() {
        let mut tree = Tree::new();
        let node = tree.insert(String::from("before"));
        tree.get_mut(node).push_str(" after");
        assert_eq!(tree.get(node), "before after");
    }
}
