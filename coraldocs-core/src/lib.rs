//! Core library for Coraldocs — a git-backed, hierarchical workspace
//! content store.
//!
//! The primary entry point is [`NodeService`], which routes every
//! operation to a per-workspace store: one git repository, one in-memory
//! node tree, and one derived link index per workspace. All mutations go
//! through `NodeService` methods and each becomes exactly one commit.
//!
//! Types are re-exported from their respective sub-modules for
//! convenience; consumers should import from the crate root rather than
//! the `core` module.

pub mod core;

// Re-export commonly used types.
#[doc(inline)]
pub use core::{
    document::{format_document, parse_document, NodeDocument},
    error::{CoreError, Result},
    id::{NodeId, WorkspaceId},
    links::{extract_links, LinkIndex, MISSING_TITLE},
    node::{Backlink, CommitMeta, DeleteResult, HistoryPage, Node, NodeKind, NodeView},
    repository::ContentRepository,
    service::{AllowAll, Authorizer, Config, NodeService, Role},
    tree::NodeTree,
    workspace::WorkspaceStore,
};
