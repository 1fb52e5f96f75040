//! In-memory node hierarchy index.
//!
//! The tree is the sole authority on parent/child relationships and node
//! existence. It stores parent pointers plus a derived parent→children
//! index — children are never owned nested collections, so subtree
//! deletion is a set computation rather than a recursive teardown, and
//! there are no structural ownership cycles.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use crate::core::error::{CoreError, Result};
use crate::core::id::NodeId;
use crate::core::node::Node;

/// Hierarchy index over node metadata for one workspace.
///
/// Mutated only under the workspace write gate; read freely otherwise.
#[derive(Debug, Default)]
pub struct NodeTree {
    nodes: HashMap<NodeId, Node>,
    /// parent → sorted child ids. Ids are time-sortable, so iteration
    /// order is creation order.
    children: HashMap<NodeId, BTreeSet<NodeId>>,
}

impl NodeTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> NodeTree {
        NodeTree::default()
    }

    /// Number of live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the tree holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// True if `id` exists and is not deleted.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Returns the node, or `None` for unknown/deleted ids.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Returns the node, failing with [`CoreError::NotFound`] otherwise.
    pub fn require(&self, id: NodeId) -> Result<&Node> {
        self.nodes
            .get(&id)
            .ok_or_else(|| CoreError::NotFound(format!("node {id}")))
    }

    /// Inserts or replaces a node, maintaining the child index.
    pub fn insert(&mut self, node: Node) {
        if let Some(prev) = self.nodes.get(&node.id) {
            if let Some(siblings) = self.children.get_mut(&prev.parent_id) {
                siblings.remove(&node.id);
            }
        }
        self.children.entry(node.parent_id).or_default().insert(node.id);
        self.nodes.insert(node.id, node);
    }

    /// Direct children of `parent_id`, in creation order. `NodeId::ZERO`
    /// lists top-level nodes. Unknown parents yield an empty list.
    #[must_use]
    pub fn list_children(&self, parent_id: NodeId) -> Vec<Node> {
        self.children
            .get(&parent_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.nodes.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Ancestor chain ordered root→node, including the node itself.
    ///
    /// # Errors
    ///
    /// [`CoreError::NotFound`] if `id` is unknown. [`CoreError::Integrity`]
    /// if the walk revisits an id (a parent cycle) or hits a dangling
    /// parent pointer — corruption is reported, never repaired.
    pub fn ancestors(&self, id: NodeId) -> Result<Vec<Node>> {
        let mut chain = vec![self.require(id)?.clone()];
        let mut visited: HashSet<NodeId> = HashSet::from([id]);
        let mut current = chain[0].parent_id;
        while !current.is_zero() {
            if !visited.insert(current) {
                return Err(CoreError::Integrity(format!(
                    "parent cycle detected at node {current}"
                )));
            }
            let node = self.nodes.get(&current).ok_or_else(|| {
                CoreError::Integrity(format!("dangling parent pointer to node {current}"))
            })?;
            chain.push(node.clone());
            current = node.parent_id;
        }
        chain.reverse();
        Ok(chain)
    }

    /// True if `id` is `ancestor` or sits anywhere below it.
    ///
    /// Used for move-cycle validation. Walks the parent chain with the
    /// same corruption guard as [`NodeTree::ancestors`].
    pub fn is_self_or_descendant(&self, id: NodeId, ancestor: NodeId) -> Result<bool> {
        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut current = id;
        while !current.is_zero() {
            if current == ancestor {
                return Ok(true);
            }
            if !visited.insert(current) {
                return Err(CoreError::Integrity(format!(
                    "parent cycle detected at node {current}"
                )));
            }
            current = match self.nodes.get(&current) {
                Some(n) => n.parent_id,
                None => break,
            };
        }
        Ok(false)
    }

    /// The full descendant set of `id`, including `id` itself, computed
    /// breadth-first over the child index.
    pub fn collect_subtree(&self, id: NodeId) -> Result<Vec<NodeId>> {
        self.require(id)?;
        let mut out = Vec::new();
        let mut queue = VecDeque::from([id]);
        while let Some(current) = queue.pop_front() {
            out.push(current);
            if let Some(ids) = self.children.get(&current) {
                queue.extend(ids.iter().copied());
            }
        }
        Ok(out)
    }

    /// Removes `id` and its entire descendant subtree from the index,
    /// returning the removed ids. The caller uses the returned set to
    /// invalidate external caches.
    pub fn remove_subtree(&mut self, id: NodeId) -> Result<Vec<NodeId>> {
        let removed = self.collect_subtree(id)?;
        for rid in &removed {
            if let Some(node) = self.nodes.remove(rid) {
                if let Some(siblings) = self.children.get_mut(&node.parent_id) {
                    siblings.remove(rid);
                }
            }
            self.children.remove(rid);
        }
        Ok(removed)
    }

    /// Updates title and timestamp in place.
    pub fn rename(&mut self, id: NodeId, title: &str, updated_at: i64) -> Result<()> {
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or_else(|| CoreError::NotFound(format!("node {id}")))?;
        node.title = title.to_string();
        node.updated_at = updated_at;
        Ok(())
    }

    /// Re-parents a node. The caller is responsible for cycle checks.
    pub fn set_parent(&mut self, id: NodeId, new_parent: NodeId, updated_at: i64) -> Result<()> {
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or_else(|| CoreError::NotFound(format!("node {id}")))?;
        let old_parent = node.parent_id;
        node.parent_id = new_parent;
        node.updated_at = updated_at;
        if let Some(siblings) = self.children.get_mut(&old_parent) {
            siblings.remove(&id);
        }
        self.children.entry(new_parent).or_default().insert(id);
        Ok(())
    }

    /// All nodes, ordered by id. Used for the sidecar snapshot and search.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Node> {
        let mut nodes: Vec<Node> = self.nodes.values().cloned().collect();
        nodes.sort_by_key(|n| n.id);
        nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::id::WorkspaceId;
    use crate::core::node::NodeKind;

    fn node(ws: WorkspaceId, parent: NodeId, title: &str) -> Node {
        Node {
            id: NodeId::generate(),
            workspace_id: ws,
            parent_id: parent,
            kind: NodeKind::Page,
            title: title.to_string(),
            created_at: 1,
            updated_at: 1,
        }
    }

    #[test]
    fn test_children_in_creation_order() {
        let ws = WorkspaceId::new();
        let mut tree = NodeTree::new();
        let first = node(ws, NodeId::ZERO, "first");
        let second = node(ws, NodeId::ZERO, "second");
        tree.insert(second.clone());
        tree.insert(first.clone());
        let children = tree.list_children(NodeId::ZERO);
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].id, first.id);
        assert_eq!(children[1].id, second.id);
    }

    #[test]
    fn test_ancestors_root_to_node() {
        let ws = WorkspaceId::new();
        let mut tree = NodeTree::new();
        let root = node(ws, NodeId::ZERO, "root");
        let mid = node(ws, root.id, "mid");
        let leaf = node(ws, mid.id, "leaf");
        tree.insert(root.clone());
        tree.insert(mid.clone());
        tree.insert(leaf.clone());
        let chain = tree.ancestors(leaf.id).unwrap();
        let ids: Vec<NodeId> = chain.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![root.id, mid.id, leaf.id]);
    }

    #[test]
    fn test_ancestors_detects_cycle() {
        let ws = WorkspaceId::new();
        let mut tree = NodeTree::new();
        let mut a = node(ws, NodeId::ZERO, "a");
        let b = node(ws, a.id, "b");
        // Corrupt the index: a's parent points back at its own child.
        a.parent_id = b.id;
        tree.insert(a.clone());
        tree.insert(b.clone());
        let err = tree.ancestors(b.id).unwrap_err();
        assert!(matches!(err, CoreError::Integrity(_)));
    }

    #[test]
    fn test_ancestors_detects_dangling_parent() {
        let ws = WorkspaceId::new();
        let mut tree = NodeTree::new();
        let orphan = node(ws, NodeId::generate(), "orphan");
        tree.insert(orphan.clone());
        let err = tree.ancestors(orphan.id).unwrap_err();
        assert!(matches!(err, CoreError::Integrity(_)));
    }

    #[test]
    fn test_remove_subtree_returns_all_descendants() {
        let ws = WorkspaceId::new();
        let mut tree = NodeTree::new();
        let root = node(ws, NodeId::ZERO, "root");
        let child = node(ws, root.id, "child");
        let grandchild = node(ws, child.id, "grandchild");
        let bystander = node(ws, NodeId::ZERO, "bystander");
        tree.insert(root.clone());
        tree.insert(child.clone());
        tree.insert(grandchild.clone());
        tree.insert(bystander.clone());

        let removed = tree.remove_subtree(root.id).unwrap();
        assert_eq!(removed.len(), 3);
        assert!(removed.contains(&grandchild.id));
        assert!(!tree.contains(root.id));
        assert!(!tree.contains(child.id));
        assert!(tree.contains(bystander.id));
        assert_eq!(tree.list_children(NodeId::ZERO).len(), 1);
    }

    #[test]
    fn test_remove_unknown_is_not_found() {
        let mut tree = NodeTree::new();
        let err = tree.remove_subtree(NodeId::generate()).unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[test]
    fn test_set_parent_moves_between_sibling_sets() {
        let ws = WorkspaceId::new();
        let mut tree = NodeTree::new();
        let a = node(ws, NodeId::ZERO, "a");
        let b = node(ws, NodeId::ZERO, "b");
        let child = node(ws, a.id, "child");
        tree.insert(a.clone());
        tree.insert(b.clone());
        tree.insert(child.clone());

        tree.set_parent(child.id, b.id, 2).unwrap();
        assert!(tree.list_children(a.id).is_empty());
        assert_eq!(tree.list_children(b.id)[0].id, child.id);
        assert_eq!(tree.get(child.id).unwrap().updated_at, 2);
    }

    #[test]
    fn test_is_self_or_descendant() {
        let ws = WorkspaceId::new();
        let mut tree = NodeTree::new();
        let root = node(ws, NodeId::ZERO, "root");
        let child = node(ws, root.id, "child");
        tree.insert(root.clone());
        tree.insert(child.clone());
        assert!(tree.is_self_or_descendant(child.id, root.id).unwrap());
        assert!(tree.is_self_or_descendant(root.id, root.id).unwrap());
        assert!(!tree.is_self_or_descendant(root.id, child.id).unwrap());
    }
}
