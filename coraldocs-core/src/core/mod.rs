//! Internal domain modules for the Coraldocs core library.
//!
//! All public types from these modules are re-exported at the crate root
//! with `#[doc(inline)]`; import from there in preference to this module.

pub mod document;
pub mod error;
pub mod id;
pub mod links;
pub mod node;
pub mod repository;
pub mod service;
pub mod tree;
pub mod workspace;

#[doc(inline)]
pub use document::{format_document, parse_document, NodeDocument};
#[doc(inline)]
pub use error::{CoreError, Result};
#[doc(inline)]
pub use id::{NodeId, WorkspaceId};
#[doc(inline)]
pub use links::{extract_links, LinkIndex, MISSING_TITLE};
#[doc(inline)]
pub use node::{Backlink, CommitMeta, DeleteResult, HistoryPage, Node, NodeKind, NodeView};
#[doc(inline)]
pub use repository::ContentRepository;
#[doc(inline)]
pub use service::{AllowAll, Authorizer, Config, NodeService, Role};
#[doc(inline)]
pub use tree::NodeTree;
#[doc(inline)]
pub use workspace::WorkspaceStore;
