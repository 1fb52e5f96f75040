//! On-disk node file format: front matter plus opaque body.
//!
//! Every node is one file, `nodes/<id>/index.md`, regardless of kind. The
//! front matter carries the hierarchy metadata (`title`, `kind`, `parent`,
//! `created`, `modified`) so the tree index can be rebuilt from a plain
//! repository scan; the body is the node's content — markdown for pages,
//! a JSON payload for tables.
//!
//! Whitespace rule: formatting emits a blank line after the front matter
//! and strips leading blank lines from the body, so a stored body never
//! starts with a newline. Everything else round-trips byte-exact.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::core::id::NodeId;
use crate::core::node::NodeKind;

/// The parsed form of one node file.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDocument {
    pub title: String,
    pub kind: NodeKind,
    /// [`NodeId::ZERO`] for top-level nodes.
    pub parent_id: NodeId,
    /// Unix seconds.
    pub created_at: i64,
    /// Unix seconds.
    pub updated_at: i64,
    pub body: String,
}

fn format_timestamp(ts: i64) -> String {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
        .to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_timestamp(s: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(s).ok().map(|t| t.timestamp())
}

/// Renders a node file: front matter, a blank separator line, then the
/// body with leading blank lines stripped.
#[must_use]
pub fn format_document(doc: &NodeDocument) -> String {
    let mut out = String::from("---\n");
    out.push_str(&format!("title: {}\n", doc.title));
    out.push_str(&format!("kind: {}\n", doc.kind.as_str()));
    if !doc.parent_id.is_zero() {
        out.push_str(&format!("parent: {}\n", doc.parent_id));
    }
    out.push_str(&format!("created: {}\n", format_timestamp(doc.created_at)));
    out.push_str(&format!("modified: {}\n", format_timestamp(doc.updated_at)));
    out.push_str("---\n\n");
    out.push_str(doc.body.trim_start_matches('\n'));
    out
}

/// Parses a node file leniently: unknown lines are skipped, missing or
/// unparseable fields fall back to defaults (`now` for timestamps, `Page`
/// for kind, top level for parent). Content without front matter is
/// treated as an untitled page body.
#[must_use]
pub fn parse_document(raw: &str, now: i64) -> NodeDocument {
    let mut title = String::new();
    let mut kind = NodeKind::Page;
    let mut parent_id = NodeId::ZERO;
    let mut created_at = 0;
    let mut updated_at = 0;
    let mut body = raw;

    if let Some(stripped) = raw.strip_prefix("---\n") {
        if let Some((front, rest)) = stripped.split_once("\n---") {
            body = rest.trim_start_matches('\n');
            for line in front.lines() {
                if let Some(v) = line.strip_prefix("title:") {
                    title = v.trim().to_string();
                } else if let Some(v) = line.strip_prefix("kind:") {
                    kind = NodeKind::from_str_lenient(v.trim());
                } else if let Some(v) = line.strip_prefix("parent:") {
                    parent_id = v.trim().parse().unwrap_or(NodeId::ZERO);
                } else if let Some(v) = line.strip_prefix("created:") {
                    created_at = parse_timestamp(v.trim()).unwrap_or(0);
                } else if let Some(v) = line.strip_prefix("modified:") {
                    updated_at = parse_timestamp(v.trim()).unwrap_or(0);
                }
            }
        }
    }

    if created_at == 0 {
        created_at = now;
    }
    if updated_at == 0 {
        updated_at = now;
    }

    NodeDocument {
        title,
        kind,
        parent_id,
        created_at,
        updated_at,
        body: body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(parent_id: NodeId) -> NodeDocument {
        NodeDocument {
            title: "Release Plan".to_string(),
            kind: NodeKind::Page,
            parent_id,
            created_at: 1_735_689_600, // 2025-01-01
            updated_at: 1_735_776_000,
            body: "# Plan\n\nShip it.\n".to_string(),
        }
    }

    #[test]
    fn test_roundtrip_top_level() {
        let doc = sample(NodeId::ZERO);
        let raw = format_document(&doc);
        assert!(raw.starts_with("---\ntitle: Release Plan\nkind: page\n"));
        assert!(!raw.contains("parent:"));
        let back = parse_document(&raw, 0);
        assert_eq!(back, doc);
    }

    #[test]
    fn test_roundtrip_with_parent() {
        let parent = NodeId::generate();
        let doc = sample(parent);
        let back = parse_document(&format_document(&doc), 0);
        assert_eq!(back.parent_id, parent);
    }

    #[test]
    fn test_leading_blank_lines_are_stripped() {
        let mut doc = sample(NodeId::ZERO);
        doc.body = "\n\n\nactual content".to_string();
        let back = parse_document(&format_document(&doc), 0);
        assert_eq!(back.body, "actual content");
    }

    #[test]
    fn test_table_kind_and_json_body() {
        let mut doc = sample(NodeId::ZERO);
        doc.kind = NodeKind::Table;
        doc.body = r#"{"columns":[{"name":"Status"}],"records":[]}"#.to_string();
        let back = parse_document(&format_document(&doc), 0);
        assert_eq!(back.kind, NodeKind::Table);
        assert_eq!(back.body, doc.body);
    }

    #[test]
    fn test_missing_front_matter_is_untitled_page() {
        let back = parse_document("just some text", 42);
        assert_eq!(back.title, "");
        assert_eq!(back.kind, NodeKind::Page);
        assert_eq!(back.body, "just some text");
        assert_eq!(back.created_at, 42);
        assert_eq!(back.updated_at, 42);
    }

    #[test]
    fn test_invalid_parent_falls_back_to_top_level() {
        let raw = "---\ntitle: X\nkind: page\nparent: garbage\n---\n\nbody";
        let back = parse_document(raw, 1);
        assert!(back.parent_id.is_zero());
    }
}
