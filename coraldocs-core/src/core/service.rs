//! The service facade: authorization, validation, and workspace routing.
//!
//! `NodeService` owns one lazily-opened [`WorkspaceStore`] per workspace
//! and is the only public entry point for callers. Every operation names
//! a principal and a workspace; the authorization collaborator is
//! consulted before anything else happens, so a denied call has no
//! partial effect.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use crate::core::error::{CoreError, Result};
use crate::core::id::{NodeId, WorkspaceId};
use crate::core::node::{DeleteResult, HistoryPage, Node, NodeKind, NodeView};
use crate::core::workspace::WorkspaceStore;

/// The access level an operation requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Read operations.
    Viewer,
    /// Mutating operations; implies Viewer.
    Editor,
}

impl Role {
    fn as_str(self) -> &'static str {
        match self {
            Role::Viewer => "viewer",
            Role::Editor => "editor",
        }
    }
}

/// Answers whether a principal may act on a workspace at a given level.
///
/// Identity and membership live outside this crate; implementations
/// typically wrap a session or membership lookup. Errors from the
/// collaborator propagate as-is and also block the operation.
pub trait Authorizer: Send + Sync {
    fn allows(&self, principal: &str, workspace: WorkspaceId, role: Role) -> Result<bool>;
}

/// Permits everything. The default for single-user embedding and tests.
pub struct AllowAll;

impl Authorizer for AllowAll {
    fn allows(&self, _principal: &str, _workspace: WorkspaceId, _role: Role) -> Result<bool> {
        Ok(true)
    }
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory under which each workspace gets `<root>/<workspace_uuid>/`.
    pub root_dir: PathBuf,
    /// Commit author identity.
    pub author_name: String,
    pub author_email: String,
    /// Bound on waiting for a workspace's write gate.
    pub lock_timeout: Duration,
}

impl Config {
    /// Defaults for everything but the root directory.
    #[must_use]
    pub fn new(root_dir: impl Into<PathBuf>) -> Config {
        Config {
            root_dir: root_dir.into(),
            author_name: "coraldocs".to_string(),
            author_email: "coraldocs@localhost".to_string(),
            lock_timeout: Duration::from_secs(5),
        }
    }
}

/// Orchestrates all node operations across workspaces.
///
/// Stores are opened on first touch and cached for the service lifetime;
/// opening is guarded by a double-checked write lock so concurrent first
/// touches of the same workspace share one store.
pub struct NodeService {
    config: Config,
    authorizer: Box<dyn Authorizer>,
    stores: RwLock<HashMap<WorkspaceId, Arc<WorkspaceStore>>>,
}

impl NodeService {
    /// Creates a service that permits every principal.
    #[must_use]
    pub fn new(config: Config) -> NodeService {
        NodeService::with_authorizer(config, Box::new(AllowAll))
    }

    /// Creates a service with a custom authorization collaborator.
    #[must_use]
    pub fn with_authorizer(config: Config, authorizer: Box<dyn Authorizer>) -> NodeService {
        NodeService {
            config,
            authorizer,
            stores: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a new, empty workspace: directory, git repository, initial
    /// commit.
    ///
    /// The whole check-open-insert sequence runs under the stores write
    /// lock so concurrent initializations of the same workspace resolve
    /// to one winner, and a racing [`NodeService::store`] call can never
    /// cache a second store over the same repository.
    ///
    /// # Errors
    ///
    /// [`CoreError::Conflict`] when the workspace already exists.
    pub fn init_workspace(&self, workspace: WorkspaceId) -> Result<()> {
        let mut stores = self.write_stores();
        if stores.contains_key(&workspace) || self.workspace_dir(workspace).exists() {
            return Err(CoreError::Conflict(format!(
                "workspace {workspace} already exists"
            )));
        }
        let store = self.open_store(workspace)?;
        stores.insert(workspace, store);
        log::info!("initialized workspace {workspace}");
        Ok(())
    }

    /// Creates a node and returns its metadata.
    pub fn create_node(
        &self,
        principal: &str,
        workspace: WorkspaceId,
        parent_id: NodeId,
        kind: NodeKind,
        title: &str,
        content: &str,
    ) -> Result<Node> {
        self.authorize(principal, workspace, Role::Editor)?;
        validate_title(title)?;
        let store = self.store(workspace)?;
        let node = store.create(parent_id, kind, title, content)?;
        log::debug!("created {} {} in workspace {workspace}", kind.as_str(), node.id);
        Ok(node)
    }

    /// Full read view of one node: metadata, content, backlinks, and the
    /// ancestor chain.
    pub fn get_node(
        &self,
        principal: &str,
        workspace: WorkspaceId,
        id: NodeId,
    ) -> Result<NodeView> {
        self.authorize(principal, workspace, Role::Viewer)?;
        let store = self.store(workspace)?;
        self.view(&store, id)
    }

    /// Rewrites a node's title and/or content in one commit and returns
    /// the fresh view.
    pub fn update_node(
        &self,
        principal: &str,
        workspace: WorkspaceId,
        id: NodeId,
        title: Option<&str>,
        content: Option<&str>,
    ) -> Result<NodeView> {
        self.authorize(principal, workspace, Role::Editor)?;
        if let Some(title) = title {
            validate_title(title)?;
        }
        let store = self.store(workspace)?;
        store.update(id, title, content).map_err(|e| e.with_node(id))?;
        self.view(&store, id)
    }

    /// Deletes a node and its whole subtree.
    pub fn delete_node(
        &self,
        principal: &str,
        workspace: WorkspaceId,
        id: NodeId,
    ) -> Result<DeleteResult> {
        self.authorize(principal, workspace, Role::Editor)?;
        let store = self.store(workspace)?;
        let result = store.delete(id).map_err(|e| e.with_node(id))?;
        log::debug!(
            "deleted node {id} and {} descendants in workspace {workspace}",
            result.deleted_count - 1
        );
        Ok(result)
    }

    /// Re-parents a node; `NodeId::ZERO` moves it to the top level.
    pub fn move_node(
        &self,
        principal: &str,
        workspace: WorkspaceId,
        id: NodeId,
        new_parent: NodeId,
    ) -> Result<Node> {
        self.authorize(principal, workspace, Role::Editor)?;
        let store = self.store(workspace)?;
        store.move_node(id, new_parent).map_err(|e| e.with_node(id))
    }

    /// Direct children of `parent_id` in creation order; `NodeId::ZERO`
    /// lists the top level.
    pub fn list_children(
        &self,
        principal: &str,
        workspace: WorkspaceId,
        parent_id: NodeId,
    ) -> Result<Vec<Node>> {
        self.authorize(principal, workspace, Role::Viewer)?;
        self.store(workspace)?.list_children(parent_id)
    }

    /// Batch title lookup for rendering links; unknown ids resolve to the
    /// missing-title sentinel.
    pub fn get_titles(
        &self,
        principal: &str,
        workspace: WorkspaceId,
        ids: &[NodeId],
    ) -> Result<HashMap<NodeId, String>> {
        self.authorize(principal, workspace, Role::Viewer)?;
        Ok(self.store(workspace)?.titles(ids))
    }

    /// One page of a node's commit history, newest first.
    pub fn get_history(
        &self,
        principal: &str,
        workspace: WorkspaceId,
        id: NodeId,
        cursor: Option<&str>,
        limit: usize,
    ) -> Result<HistoryPage> {
        self.authorize(principal, workspace, Role::Viewer)?;
        self.store(workspace)?
            .history(id, cursor, limit)
            .map_err(|e| e.with_node(id))
    }

    /// A node's content as of a specific commit.
    pub fn node_version(
        &self,
        principal: &str,
        workspace: WorkspaceId,
        id: NodeId,
        commit_hash: &str,
    ) -> Result<String> {
        self.authorize(principal, workspace, Role::Viewer)?;
        self.store(workspace)?
            .version(id, commit_hash)
            .map_err(|e| e.with_node(id))
    }

    /// Case-insensitive substring search over titles and bodies.
    pub fn search(
        &self,
        principal: &str,
        workspace: WorkspaceId,
        query: &str,
    ) -> Result<Vec<Node>> {
        self.authorize(principal, workspace, Role::Viewer)?;
        self.store(workspace)?.search(query)
    }

    // --- internals ---

    fn view(&self, store: &WorkspaceStore, id: NodeId) -> Result<NodeView> {
        let node = store.node(id)?;
        let content = store.content(id).map_err(|e| e.with_node(id))?;
        let backlinks = store.backlinks(id)?;
        let breadcrumbs = store.breadcrumbs(id).map_err(|e| e.with_node(id))?;
        Ok(NodeView {
            node,
            content,
            backlinks,
            breadcrumbs,
        })
    }

    fn authorize(&self, principal: &str, workspace: WorkspaceId, role: Role) -> Result<()> {
        if self.authorizer.allows(principal, workspace, role)? {
            Ok(())
        } else {
            Err(CoreError::Forbidden(format!(
                "principal {principal:?} is not a {} of workspace {workspace}",
                role.as_str()
            )))
        }
    }

    fn workspace_dir(&self, workspace: WorkspaceId) -> PathBuf {
        self.config.root_dir.join(workspace.to_string())
    }

    /// Returns the cached store for `workspace`, opening it on first
    /// touch. Fails with `NotFound` for workspaces never initialized.
    fn store(&self, workspace: WorkspaceId) -> Result<Arc<WorkspaceStore>> {
        if let Some(store) = self.read_stores().get(&workspace) {
            return Ok(Arc::clone(store));
        }
        if !self.workspace_dir(workspace).is_dir() {
            return Err(CoreError::NotFound(format!("workspace {workspace}")));
        }
        // Double-checked: another thread may have opened it while we were
        // waiting for the write lock.
        let mut stores = self.write_stores();
        if let Some(store) = stores.get(&workspace) {
            return Ok(Arc::clone(store));
        }
        let store = self.open_store(workspace)?;
        stores.insert(workspace, Arc::clone(&store));
        Ok(store)
    }

    fn open_store(&self, workspace: WorkspaceId) -> Result<Arc<WorkspaceStore>> {
        let store = WorkspaceStore::open(
            workspace,
            &self.workspace_dir(workspace),
            &self.config.author_name,
            &self.config.author_email,
            self.config.lock_timeout,
        )?;
        Ok(Arc::new(store))
    }

    fn read_stores(
        &self,
    ) -> std::sync::RwLockReadGuard<'_, HashMap<WorkspaceId, Arc<WorkspaceStore>>> {
        self.stores.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_stores(
        &self,
    ) -> std::sync::RwLockWriteGuard<'_, HashMap<WorkspaceId, Arc<WorkspaceStore>>> {
        self.stores.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation("title must not be empty".to_string()));
    }
    if title.contains('\n') {
        return Err(CoreError::Validation(
            "title must not contain line breaks".to_string(),
        ));
    }
    Ok(())
}
