//! Derived link index: which nodes reference which, and the reverse.
//!
//! The index is a rebuildable materialized view over node content, never
//! a source of truth. It is rebuilt from a full scan whenever a workspace
//! store opens, and updated wholesale per source node on every content
//! change — no incremental diffing.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::core::id::NodeId;

/// Title reported for a backlink source or title lookup whose node no
/// longer exists. A link to a deleted node renders as this sentinel
/// rather than erroring the whole view.
pub const MISSING_TITLE: &str = "(missing)";

static LINK_RE: OnceLock<Regex> = OnceLock::new();

fn link_regex() -> &'static Regex {
    // Markdown inline links; the target must not contain whitespace or
    // parentheses, which internal node paths never do.
    LINK_RE.get_or_init(|| Regex::new(r"\[[^\]]*\]\(([^()\s]+)\)").expect("static link pattern"))
}

/// Extracts the node a single link target points at, if it is an
/// internal reference. Internal references are relative paths ending in
/// `/index.md` whose final directory segment is a node id. External
/// URLs, absolute paths, fragments, and malformed ids are ignored.
fn target_node(target: &str) -> Option<NodeId> {
    if target.starts_with('/') || target.starts_with('#') || target.contains("://") {
        return None;
    }
    let dir = target.strip_suffix("/index.md")?;
    let segment = dir.rsplit('/').next()?;
    segment.parse::<NodeId>().ok().filter(|id| !id.is_zero())
}

/// Parses `content` for internal node references.
///
/// Duplicates are collapsed; first-occurrence order is preserved.
#[must_use]
pub fn extract_links(content: &str) -> Vec<NodeId> {
    let mut out = Vec::new();
    for cap in link_regex().captures_iter(content) {
        if let Some(id) = target_node(&cap[1]) {
            if !out.contains(&id) {
                out.push(id);
            }
        }
    }
    out
}

/// Bidirectional link index for one workspace.
///
/// The forward map (source → targets) exists so updates can replace a
/// source's edges wholesale; the backward map (target → sources) gives
/// O(1) backlink lookups. Mutated only under the workspace write gate.
#[derive(Debug, Default)]
pub struct LinkIndex {
    forward: HashMap<NodeId, Vec<NodeId>>,
    backward: HashMap<NodeId, Vec<NodeId>>,
}

impl LinkIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> LinkIndex {
        LinkIndex::default()
    }

    /// Rebuilds the whole index from `(source, content)` pairs.
    pub fn rebuild<'a>(&mut self, sources: impl Iterator<Item = (NodeId, &'a str)>) {
        self.forward.clear();
        self.backward.clear();
        for (id, content) in sources {
            self.update(id, extract_links(content));
        }
    }

    /// Replaces all outbound edges of `source` with `targets`, keeping
    /// the backward map consistent. Self-links are retained as-is.
    pub fn update(&mut self, source: NodeId, targets: Vec<NodeId>) {
        self.remove(source);
        for target in &targets {
            self.backward.entry(*target).or_default().push(source);
        }
        if !targets.is_empty() {
            self.forward.insert(source, targets);
        }
    }

    /// Drops all outbound edges of `source`. Called when a node is
    /// deleted or its content loses its links.
    pub fn remove(&mut self, source: NodeId) {
        if let Some(old_targets) = self.forward.remove(&source) {
            for target in old_targets {
                if let Some(sources) = self.backward.get_mut(&target) {
                    sources.retain(|s| *s != source);
                    if sources.is_empty() {
                        self.backward.remove(&target);
                    }
                }
            }
        }
    }

    /// Ids of nodes whose content links to `target`.
    #[must_use]
    pub fn backlinks(&self, target: NodeId) -> Vec<NodeId> {
        self.backward.get(&target).cloned().unwrap_or_default()
    }

    /// Outbound targets of `source`; empty when it links nowhere.
    #[must_use]
    pub fn outbound(&self, source: NodeId) -> Vec<NodeId> {
        self.forward.get(&source).cloned().unwrap_or_default()
    }
}
