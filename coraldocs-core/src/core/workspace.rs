//! Per-workspace store: one git repository, one node tree, one link index.
//!
//! Mutations are serialized by a write gate so each logical operation
//! becomes exactly one commit applied against the current head. Reads
//! never take the gate: the tree and link index sit behind `RwLock`s and
//! content reads go straight to the working directory.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Condvar, Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant};

use chrono::Utc;

use crate::core::document::{format_document, parse_document, NodeDocument};
use crate::core::error::{CoreError, Result};
use crate::core::id::{NodeId, WorkspaceId};
use crate::core::links::{extract_links, LinkIndex, MISSING_TITLE};
use crate::core::node::{Backlink, DeleteResult, HistoryPage, Node, NodeKind};
use crate::core::repository::{read_current, ContentRepository, SIDECAR_DIR};
use crate::core::tree::NodeTree;

/// Sidecar file holding the serialized tree index.
const SIDECAR_FILE: &str = "tree.json";

fn node_rel_path(id: NodeId) -> String {
    format!("nodes/{id}/index.md")
}

/// Serializes writers with a bounded wait.
///
/// A plain mutex would block unboundedly; the gate turns contention past
/// the configured timeout into a [`CoreError::Timeout`] instead.
struct WriteGate {
    busy: Mutex<bool>,
    idle: Condvar,
}

impl WriteGate {
    fn new() -> WriteGate {
        WriteGate {
            busy: Mutex::new(false),
            idle: Condvar::new(),
        }
    }

    fn acquire(&self, timeout: Duration) -> Result<GateGuard<'_>> {
        let deadline = Instant::now() + timeout;
        let mut busy = self
            .busy
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        while *busy {
            let now = Instant::now();
            if now >= deadline {
                return Err(CoreError::Timeout(
                    "workspace write lock not acquired in time".to_string(),
                ));
            }
            let (guard, _) = self
                .idle
                .wait_timeout(busy, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            busy = guard;
        }
        *busy = true;
        Ok(GateGuard { gate: self })
    }
}

struct GateGuard<'a> {
    gate: &'a WriteGate,
}

impl Drop for GateGuard<'_> {
    fn drop(&mut self) {
        let mut busy = self
            .gate
            .busy
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *busy = false;
        self.gate.idle.notify_one();
    }
}

/// All state of one workspace.
///
/// The repository handle is behind its own mutex (libgit2 handles are not
/// sync); writers hold it only for the duration of a commit, and content
/// reads bypass it entirely by reading the working directory.
pub struct WorkspaceStore {
    workspace_id: WorkspaceId,
    dir: PathBuf,
    repo: Mutex<ContentRepository>,
    tree: RwLock<NodeTree>,
    links: RwLock<LinkIndex>,
    gate: WriteGate,
    lock_timeout: Duration,
}

impl WorkspaceStore {
    /// Opens the store at `dir`, initializing the repository on first use.
    ///
    /// The tree index is loaded from the sidecar when present and
    /// readable, otherwise rebuilt by scanning `nodes/`. The link index is
    /// always rebuilt from node bodies, so reads never pay for a lazy
    /// build later.
    pub fn open(
        workspace_id: WorkspaceId,
        dir: &Path,
        author_name: &str,
        author_email: &str,
        lock_timeout: Duration,
    ) -> Result<WorkspaceStore> {
        let repo = ContentRepository::open_or_init(dir, author_name, author_email)?;

        // A sidecar that is missing, unreadable, or stale (its files were
        // changed behind our back) falls back to a repository scan.
        let (tree, bodies) = match load_sidecar(dir).and_then(|tree| {
            read_bodies(dir, &tree).ok().map(|bodies| (tree, bodies))
        }) {
            Some(pair) => pair,
            None => {
                let tree = scan_nodes(dir, workspace_id)?;
                let bodies = read_bodies(dir, &tree)?;
                (tree, bodies)
            }
        };

        let mut links = LinkIndex::new();
        links.rebuild(bodies.iter().map(|(id, body)| (*id, body.as_str())));

        Ok(WorkspaceStore {
            workspace_id,
            dir: dir.to_path_buf(),
            repo: Mutex::new(repo),
            tree: RwLock::new(tree),
            links: RwLock::new(links),
            gate: WriteGate::new(),
            lock_timeout,
        })
    }

    /// The workspace this store belongs to.
    #[must_use]
    pub fn workspace_id(&self) -> WorkspaceId {
        self.workspace_id
    }

    // --- mutations (serialized by the write gate) ---

    /// Creates a node under `parent_id` and commits it.
    pub fn create(
        &self,
        parent_id: NodeId,
        kind: NodeKind,
        title: &str,
        body: &str,
    ) -> Result<Node> {
        let _gate = self.gate.acquire(self.lock_timeout)?;
        if !parent_id.is_zero() && !self.read_tree().contains(parent_id) {
            return Err(CoreError::NotFound(format!("parent node {parent_id}")));
        }

        let now = Utc::now().timestamp();
        let id = NodeId::generate();
        let node = Node {
            id,
            workspace_id: self.workspace_id,
            parent_id,
            kind,
            title: title.to_string(),
            created_at: now,
            updated_at: now,
        };
        let raw = format_document(&NodeDocument {
            title: title.to_string(),
            kind,
            parent_id,
            created_at: now,
            updated_at: now,
            body: body.to_string(),
        });

        self.commit(
            &[(node_rel_path(id), raw)],
            &[],
            &format!("create {} {id}: {title}", kind.as_str()),
        )?;

        self.write_tree().insert(node.clone());
        self.write_links().update(id, extract_links(body));
        self.persist_sidecar();
        Ok(node)
    }

    /// Rewrites a node's title and/or body in one commit. A no-change
    /// update still commits, so history always grows by one per call.
    pub fn update(&self, id: NodeId, title: Option<&str>, body: Option<&str>) -> Result<Node> {
        let _gate = self.gate.acquire(self.lock_timeout)?;
        let mut node = self.read_tree().require(id)?.clone();

        let now = Utc::now().timestamp();
        let current = parse_document(&read_current(&self.dir, &node_rel_path(id))?, now);
        let new_title = title.unwrap_or(&node.title).to_string();
        let new_body = body.unwrap_or(&current.body).to_string();

        let raw = format_document(&NodeDocument {
            title: new_title.clone(),
            kind: node.kind,
            parent_id: node.parent_id,
            created_at: node.created_at,
            updated_at: now,
            body: new_body.clone(),
        });
        self.commit(
            &[(node_rel_path(id), raw)],
            &[],
            &format!("update {} {id}: {new_title}", node.kind.as_str()),
        )?;

        self.write_tree().rename(id, &new_title, now)?;
        self.write_links().update(id, extract_links(&new_body));
        self.persist_sidecar();

        node.title = new_title;
        node.updated_at = now;
        Ok(node)
    }

    /// Deletes a node and its entire subtree in one commit.
    pub fn delete(&self, id: NodeId) -> Result<DeleteResult> {
        let _gate = self.gate.acquire(self.lock_timeout)?;
        let (node, removed) = {
            let tree = self.read_tree();
            (tree.require(id)?.clone(), tree.collect_subtree(id)?)
        };

        let removals: Vec<String> = removed.iter().map(|rid| node_rel_path(*rid)).collect();
        self.commit(
            &[],
            &removals,
            &format!(
                "delete {} {id}: {} ({} nodes)",
                node.kind.as_str(),
                node.title,
                removed.len()
            ),
        )?;

        let removed = self.write_tree().remove_subtree(id)?;
        {
            let mut links = self.write_links();
            for rid in &removed {
                links.remove(*rid);
            }
        }
        self.persist_sidecar();
        Ok(DeleteResult {
            deleted_count: removed.len(),
            removed_ids: removed,
        })
    }

    /// Re-parents a node. Moving a node under itself or any of its
    /// descendants fails with `Validation` and changes nothing.
    pub fn move_node(&self, id: NodeId, new_parent: NodeId) -> Result<Node> {
        let _gate = self.gate.acquire(self.lock_timeout)?;
        let node = {
            let tree = self.read_tree();
            let node = tree.require(id)?.clone();
            if !new_parent.is_zero() {
                tree.require(new_parent)
                    .map_err(|_| CoreError::NotFound(format!("parent node {new_parent}")))?;
                if tree.is_self_or_descendant(new_parent, id)? {
                    return Err(CoreError::Validation(
                        "cannot move a node under its own subtree".to_string(),
                    ));
                }
            }
            node
        };

        let now = Utc::now().timestamp();
        let current = parse_document(&read_current(&self.dir, &node_rel_path(id))?, now);
        let raw = format_document(&NodeDocument {
            title: node.title.clone(),
            kind: node.kind,
            parent_id: new_parent,
            created_at: node.created_at,
            updated_at: now,
            body: current.body,
        });
        self.commit(
            &[(node_rel_path(id), raw)],
            &[],
            &format!("move {} {id}: {}", node.kind.as_str(), node.title),
        )?;

        self.write_tree().set_parent(id, new_parent, now)?;
        self.persist_sidecar();

        let mut node = node;
        node.parent_id = new_parent;
        node.updated_at = now;
        Ok(node)
    }

    // --- reads (gate-free) ---

    /// Node metadata by id.
    pub fn node(&self, id: NodeId) -> Result<Node> {
        Ok(self.read_tree().require(id)?.clone())
    }

    /// Current body of a node, read straight off the working directory.
    pub fn content(&self, id: NodeId) -> Result<String> {
        self.read_tree().require(id)?;
        let raw = read_current(&self.dir, &node_rel_path(id))?;
        Ok(parse_document(&raw, 0).body)
    }

    /// Nodes whose content links to `id`, with titles resolved now.
    pub fn backlinks(&self, id: NodeId) -> Result<Vec<Backlink>> {
        self.read_tree().require(id)?;
        let sources = self.read_links().backlinks(id);
        let tree = self.read_tree();
        Ok(sources
            .into_iter()
            .map(|source| Backlink {
                node_id: source,
                title: tree
                    .get(source)
                    .map_or_else(|| MISSING_TITLE.to_string(), |n| n.title.clone()),
            })
            .collect())
    }

    /// Ancestor chain root→node, including the node itself.
    pub fn breadcrumbs(&self, id: NodeId) -> Result<Vec<Node>> {
        self.read_tree().ancestors(id)
    }

    /// Direct children in creation order; `NodeId::ZERO` lists the top
    /// level.
    pub fn list_children(&self, parent_id: NodeId) -> Result<Vec<Node>> {
        let tree = self.read_tree();
        if !parent_id.is_zero() {
            tree.require(parent_id)?;
        }
        Ok(tree.list_children(parent_id))
    }

    /// Batch title lookup; unknown ids map to the missing-title sentinel.
    #[must_use]
    pub fn titles(&self, ids: &[NodeId]) -> HashMap<NodeId, String> {
        let tree = self.read_tree();
        ids.iter()
            .map(|id| {
                let title = tree
                    .get(*id)
                    .map_or_else(|| MISSING_TITLE.to_string(), |n| n.title.clone());
                (*id, title)
            })
            .collect()
    }

    /// Reverse-chronological commit history of one node's file.
    pub fn history(&self, id: NodeId, cursor: Option<&str>, limit: usize) -> Result<HistoryPage> {
        self.read_tree().require(id)?;
        self.lock_repo().history(&node_rel_path(id), cursor, limit)
    }

    /// The node's body as of a specific commit.
    pub fn version(&self, id: NodeId, hash: &str) -> Result<String> {
        self.read_tree().require(id)?;
        let raw = self.lock_repo().read_at(hash, &node_rel_path(id))?;
        Ok(parse_document(&raw, 0).body)
    }

    /// Case-insensitive substring search over titles and bodies, ordered
    /// by node id (creation order).
    pub fn search(&self, query: &str) -> Result<Vec<Node>> {
        let needle = query.to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        let mut out = Vec::new();
        for node in self.read_tree().snapshot() {
            if node.title.to_lowercase().contains(&needle) {
                out.push(node);
                continue;
            }
            let raw = read_current(&self.dir, &node_rel_path(node.id))?;
            if parse_document(&raw, 0).body.to_lowercase().contains(&needle) {
                out.push(node);
            }
        }
        Ok(out)
    }

    // --- internals ---

    fn commit(
        &self,
        writes: &[(String, String)],
        removals: &[String],
        message: &str,
    ) -> Result<String> {
        self.lock_repo().commit_files(writes, removals, message)
    }

    /// Rewrites the sidecar tree index. Failures are logged, not raised:
    /// the commit already happened and the sidecar is rebuilt from a scan
    /// on the next open anyway.
    fn persist_sidecar(&self) {
        if let Err(e) = self.try_persist_sidecar() {
            log::warn!(
                "sidecar write failed for workspace {}: {e}",
                self.workspace_id
            );
        }
    }

    fn try_persist_sidecar(&self) -> Result<()> {
        let snapshot = self.read_tree().snapshot();
        let dir = self.dir.join(SIDECAR_DIR);
        fs::create_dir_all(&dir)?;
        let raw = serde_json::to_string_pretty(&snapshot)?;
        let tmp = dir.join(format!("{SIDECAR_FILE}.tmp"));
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, dir.join(SIDECAR_FILE))?;
        Ok(())
    }

    fn lock_repo(&self) -> std::sync::MutexGuard<'_, ContentRepository> {
        self.repo.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_tree(&self) -> std::sync::RwLockReadGuard<'_, NodeTree> {
        self.tree.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_tree(&self) -> std::sync::RwLockWriteGuard<'_, NodeTree> {
        self.tree.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_links(&self) -> std::sync::RwLockReadGuard<'_, LinkIndex> {
        self.links.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_links(&self) -> std::sync::RwLockWriteGuard<'_, LinkIndex> {
        self.links.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Loads the sidecar tree index, returning `None` when it is missing or
/// unreadable so the caller falls back to a repository scan.
fn load_sidecar(dir: &Path) -> Option<NodeTree> {
    let raw = fs::read_to_string(dir.join(SIDECAR_DIR).join(SIDECAR_FILE)).ok()?;
    let nodes: Vec<Node> = serde_json::from_str(&raw).ok()?;
    let mut tree = NodeTree::new();
    for node in nodes {
        tree.insert(node);
    }
    Some(tree)
}

/// Reads every node's current body, for the link index rebuild.
fn read_bodies(dir: &Path, tree: &NodeTree) -> Result<Vec<(NodeId, String)>> {
    let mut bodies = Vec::new();
    for node in tree.snapshot() {
        let raw = read_current(dir, &node_rel_path(node.id))?;
        bodies.push((node.id, parse_document(&raw, 0).body));
    }
    Ok(bodies)
}

/// Rebuilds the tree index from the committed node files alone.
fn scan_nodes(dir: &Path, workspace_id: WorkspaceId) -> Result<NodeTree> {
    let mut tree = NodeTree::new();
    let nodes_dir = dir.join("nodes");
    if !nodes_dir.is_dir() {
        return Ok(tree);
    }
    let now = Utc::now().timestamp();
    for entry in fs::read_dir(&nodes_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name();
        let Ok(id) = name.to_string_lossy().parse::<NodeId>() else {
            log::warn!("skipping unrecognized node directory {:?}", name);
            continue;
        };
        let raw = read_current(dir, &node_rel_path(id))?;
        let doc = parse_document(&raw, now);
        tree.insert(Node {
            id,
            workspace_id,
            parent_id: doc.parent_id,
            kind: doc.kind,
            title: doc.title,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        });
    }
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open(dir: &TempDir) -> WorkspaceStore {
        WorkspaceStore::open(
            WorkspaceId::new(),
            dir.path(),
            "tester",
            "tester@example.com",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_create_and_read_back() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);
        let node = store
            .create(NodeId::ZERO, NodeKind::Page, "Home", "# Welcome")
            .unwrap();
        assert_eq!(store.node(node.id).unwrap().title, "Home");
        assert_eq!(store.content(node.id).unwrap(), "# Welcome");
        assert_eq!(store.list_children(NodeId::ZERO).unwrap().len(), 1);
    }

    #[test]
    fn test_create_under_missing_parent_fails() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);
        let err = store
            .create(NodeId::generate(), NodeKind::Page, "Orphan", "")
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[test]
    fn test_update_grows_history_by_one() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);
        let node = store
            .create(NodeId::ZERO, NodeKind::Page, "Doc", "v1")
            .unwrap();
        store.update(node.id, None, Some("v2")).unwrap();
        // Identical content still commits.
        store.update(node.id, None, Some("v2")).unwrap();
        let page = store.history(node.id, None, 10).unwrap();
        assert_eq!(page.commits.len(), 3);
        // Oldest entry is the creation commit.
        assert!(page.commits[2].message.starts_with("create page"));
        assert_eq!(store.content(node.id).unwrap(), "v2");
    }

    #[test]
    fn test_delete_cascades_and_commits_once() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);
        let root = store
            .create(NodeId::ZERO, NodeKind::Page, "Root", "")
            .unwrap();
        let child = store
            .create(root.id, NodeKind::Page, "Child", "")
            .unwrap();
        let grandchild = store
            .create(child.id, NodeKind::Table, "Rows", "{}")
            .unwrap();

        let result = store.delete(root.id).unwrap();
        assert_eq!(result.deleted_count, 3);
        assert!(result.removed_ids.contains(&grandchild.id));
        assert!(matches!(
            store.node(child.id).unwrap_err(),
            CoreError::NotFound(_)
        ));
        assert!(!dir.path().join(format!("nodes/{}", root.id)).exists());
    }

    #[test]
    fn test_move_rejects_own_subtree() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);
        let a = store.create(NodeId::ZERO, NodeKind::Page, "A", "").unwrap();
        let b = store.create(a.id, NodeKind::Page, "B", "").unwrap();

        let err = store.move_node(a.id, b.id).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(store.node(a.id).unwrap().parent_id.is_zero());

        let err = store.move_node(a.id, a.id).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_move_rewrites_parent_header() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);
        let a = store.create(NodeId::ZERO, NodeKind::Page, "A", "").unwrap();
        let b = store.create(NodeId::ZERO, NodeKind::Page, "B", "").unwrap();
        store.move_node(b.id, a.id).unwrap();

        assert_eq!(store.node(b.id).unwrap().parent_id, a.id);
        let raw = read_current(dir.path(), &node_rel_path(b.id)).unwrap();
        assert!(raw.contains(&format!("parent: {}", a.id)));
    }

    #[test]
    fn test_backlinks_follow_renames() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);
        let target = store
            .create(NodeId::ZERO, NodeKind::Page, "Target", "")
            .unwrap();
        let source = store
            .create(
                NodeId::ZERO,
                NodeKind::Page,
                "Source",
                &format!("see [t](../{}/index.md)", target.id),
            )
            .unwrap();

        let links = store.backlinks(target.id).unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].title, "Source");

        store.update(source.id, Some("Renamed"), None).unwrap();
        assert_eq!(store.backlinks(target.id).unwrap()[0].title, "Renamed");

        store.update(source.id, None, Some("no more links")).unwrap();
        assert!(store.backlinks(target.id).unwrap().is_empty());
    }

    #[test]
    fn test_reopen_loads_sidecar_state() {
        let dir = TempDir::new().unwrap();
        let ws = WorkspaceId::new();
        let (root_id, child_id);
        {
            let store = WorkspaceStore::open(
                ws,
                dir.path(),
                "tester",
                "tester@example.com",
                Duration::from_secs(5),
            )
            .unwrap();
            let root = store
                .create(NodeId::ZERO, NodeKind::Page, "Root", "")
                .unwrap();
            let child = store.create(root.id, NodeKind::Page, "Child", "").unwrap();
            root_id = root.id;
            child_id = child.id;
        }
        let store = WorkspaceStore::open(
            ws,
            dir.path(),
            "tester",
            "tester@example.com",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(store.node(child_id).unwrap().parent_id, root_id);
        let crumbs = store.breadcrumbs(child_id).unwrap();
        assert_eq!(crumbs.len(), 2);
        assert_eq!(crumbs[0].id, root_id);
    }

    #[test]
    fn test_sidecar_loss_rebuilds_from_scan() {
        let dir = TempDir::new().unwrap();
        let ws = WorkspaceId::new();
        let (target_id, source_id);
        {
            let store = WorkspaceStore::open(
                ws,
                dir.path(),
                "tester",
                "tester@example.com",
                Duration::from_secs(5),
            )
            .unwrap();
            let target = store
                .create(NodeId::ZERO, NodeKind::Page, "Target", "")
                .unwrap();
            let source = store
                .create(
                    target.id,
                    NodeKind::Page,
                    "Source",
                    &format!("[t](../{}/index.md)", target.id),
                )
                .unwrap();
            target_id = target.id;
            source_id = source.id;
        }
        fs::remove_file(dir.path().join(SIDECAR_DIR).join(SIDECAR_FILE)).unwrap();

        let store = WorkspaceStore::open(
            ws,
            dir.path(),
            "tester",
            "tester@example.com",
            Duration::from_secs(5),
        )
        .unwrap();
        let source = store.node(source_id).unwrap();
        assert_eq!(source.parent_id, target_id);
        assert_eq!(source.title, "Source");
        let links = store.backlinks(target_id).unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].node_id, source_id);
    }

    #[test]
    fn test_version_returns_historical_body() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);
        let node = store
            .create(NodeId::ZERO, NodeKind::Page, "Doc", "old body")
            .unwrap();
        let first = store.history(node.id, None, 1).unwrap().commits[0]
            .hash
            .clone();
        store.update(node.id, None, Some("new body")).unwrap();
        assert_eq!(store.version(node.id, &first).unwrap(), "old body");
    }

    #[test]
    fn test_search_matches_title_and_body() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);
        let by_title = store
            .create(NodeId::ZERO, NodeKind::Page, "Roadmap 2026", "nothing here")
            .unwrap();
        let by_body = store
            .create(NodeId::ZERO, NodeKind::Page, "Notes", "the ROADMAP is late")
            .unwrap();
        store
            .create(NodeId::ZERO, NodeKind::Page, "Unrelated", "zzz")
            .unwrap();

        let hits = store.search("roadmap").unwrap();
        let ids: Vec<NodeId> = hits.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![by_title.id, by_body.id]);
        assert!(store.search("").unwrap().is_empty());
    }

    #[test]
    fn test_gate_times_out() {
        let dir = TempDir::new().unwrap();
        let store = WorkspaceStore::open(
            WorkspaceId::new(),
            dir.path(),
            "tester",
            "tester@example.com",
            Duration::from_millis(50),
        )
        .unwrap();
        let _held = store.gate.acquire(Duration::from_millis(50)).unwrap();
        let err = store
            .create(NodeId::ZERO, NodeKind::Page, "Blocked", "")
            .unwrap_err();
        assert!(matches!(err, CoreError::Timeout(_)));
    }
}
