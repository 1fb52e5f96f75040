//! Core data model: nodes, backlinks, commit metadata, and operation results.

use serde::{Deserialize, Serialize};

use crate::core::id::{NodeId, WorkspaceId};

/// The two content kinds a node can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A markdown document.
    Page,
    /// A structured table (schema + records, stored as an opaque payload).
    Table,
}

impl NodeKind {
    /// The lowercase name used in front matter and commit messages.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Page => "page",
            NodeKind::Table => "table",
        }
    }

    /// Parses the lowercase front-matter form; anything unrecognized
    /// defaults to `Page`, matching the lenient file parser.
    #[must_use]
    pub fn from_str_lenient(s: &str) -> NodeKind {
        match s {
            "table" => NodeKind::Table,
            _ => NodeKind::Page,
        }
    }
}

/// A logical content unit placed in the workspace hierarchy.
///
/// `parent_id` of [`NodeId::ZERO`] denotes a top-level node. Timestamps
/// are unix seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    pub workspace_id: WorkspaceId,
    pub parent_id: NodeId,
    pub kind: NodeKind,
    pub title: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// A reverse reference: a node whose content links to the queried node.
///
/// The title is resolved at query time, so renaming the source is
/// reflected in every subsequent backlink view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backlink {
    pub node_id: NodeId,
    pub title: String,
}

/// Immutable metadata of one commit touching a node's file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitMeta {
    pub hash: String,
    /// Unix seconds.
    pub timestamp: i64,
    pub message: String,
}

/// One page of reverse-chronological history, restartable via the cursor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPage {
    pub commits: Vec<CommitMeta>,
    /// Pass back as the cursor to resume after the last returned commit.
    pub next_cursor: Option<String>,
}

/// A node enriched for immediate client use: its content, who links to
/// it, and the ancestor chain from the root down to the node itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeView {
    pub node: Node,
    pub content: String,
    pub backlinks: Vec<Backlink>,
    pub breadcrumbs: Vec<Node>,
}

/// The outcome of a cascading delete.
///
/// `removed_ids` lists every node that was actually removed — the target
/// and its entire descendant subtree — so callers can reconcile caches
/// even if a later step failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub deleted_count: usize,
    pub removed_ids: Vec<NodeId>,
}
