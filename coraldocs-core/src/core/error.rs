//! Error types for the Coraldocs core library.

use thiserror::Error;

use crate::NodeId;

/// All errors that can occur within the Coraldocs core library.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Input was malformed: empty title, invalid id, bad move target.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A node or workspace was requested that does not exist (or was deleted).
    #[error("Not found: {0}")]
    NotFound(String),

    /// The authorization collaborator rejected the principal.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// A uniqueness or already-exists violation.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// An I/O operation on the filesystem failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A git repository operation failed.
    #[error("Git error: {0}")]
    Git(String),

    /// Stored data could not be serialized or deserialized as JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The node tree is corrupted: a cycle or a dangling parent pointer.
    /// Never auto-repaired; the operation that detected it is aborted.
    #[error("Integrity error: {0}")]
    Integrity(String),

    /// The workspace write lock could not be acquired within the bound.
    #[error("Timeout: {0}")]
    Timeout(String),
}

impl From<git2::Error> for CoreError {
    fn from(e: git2::Error) -> Self {
        CoreError::Git(e.message().to_string())
    }
}

/// Convenience alias that pins the error type to [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Returns a short, human-readable message suitable for display to the end user.
    ///
    /// `Io`, `Git`, and `Timeout` map to a generic retry message; the rest
    /// are actionable as-is.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::NotFound(_) => "The requested item no longer exists".to_string(),
            Self::Forbidden(_) => "You do not have access to this workspace".to_string(),
            Self::Conflict(msg) => msg.clone(),
            Self::Io(_) | Self::Git(_) | Self::Timeout(_) => {
                "A storage operation failed — please try again".to_string()
            }
            Self::Json(e) => format!("Data format error: {e}"),
            Self::Integrity(msg) => format!("Workspace data is corrupted: {msg}"),
        }
    }

    /// Attaches the failing node id to message-bearing variants.
    ///
    /// Used by the service layer so that repository and integrity failures
    /// surface the node they occurred on.
    #[must_use]
    pub fn with_node(self, id: NodeId) -> Self {
        match self {
            Self::Io(e) => Self::Io(std::io::Error::new(e.kind(), format!("node {id}: {e}"))),
            Self::Git(msg) => Self::Git(format!("node {id}: {msg}")),
            Self::Integrity(msg) => Self::Integrity(format!("node {id}: {msg}")),
            Self::Timeout(msg) => Self::Timeout(format!("node {id}: {msg}")),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_user_message_is_generic() {
        let e = CoreError::NotFound("node xyz".to_string());
        assert!(!e.user_message().contains("xyz"));
    }

    #[test]
    fn test_with_node_annotates_git_errors() {
        let id = NodeId::generate();
        let e = CoreError::Git("commit failed".to_string()).with_node(id);
        assert!(e.to_string().contains(&id.to_string()));
    }

    #[test]
    fn test_with_node_annotates_io_errors() {
        let id = NodeId::generate();
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let e = CoreError::Io(io).with_node(id);
        assert!(matches!(e, CoreError::Io(_)));
        assert!(e.to_string().contains(&id.to_string()));
        assert!(e.to_string().contains("disk full"));
    }

    #[test]
    fn test_with_node_leaves_not_found_untouched() {
        let id = NodeId::generate();
        let e = CoreError::NotFound("workspace".to_string()).with_node(id);
        assert_eq!(e.to_string(), "Not found: workspace");
    }
}
