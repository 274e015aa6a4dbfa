//! Error taxonomy for the document core.
//!
//! Three families: malformed saved documents (load fails atomically and the
//! previous in-memory document is untouched), invalid operations (rejected
//! before any mutation), and I/O failures surfaced with their cause. Cascading
//! operations on a well-formed document never fail; internal consistency is a
//! programming error guarded by debug assertions, not a runtime variant here.

use crate::node::NodeId;

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    // Malformed saved documents.
    #[error("malformed document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("malformed document: {context} index {index} out of range (document has {len} nodes)")]
    IndexOutOfRange {
        context: &'static str,
        index: usize,
        len: usize,
    },
    #[error("malformed document: invalid color string `{0}`")]
    InvalidColor(String),
    #[error("malformed document: unknown shape kind `{0}`")]
    InvalidShape(String),
    #[error("malformed document: invalid hierarchy at node {index}: {reason}")]
    InvalidHierarchy { index: usize, reason: &'static str },

    // Invalid operations.
    #[error("cannot connect a node to itself")]
    SelfConnection,
    #[error("nodes are already connected")]
    DuplicateConnection,
    #[error("manual connect requires exactly two selected nodes, got {0}")]
    SelectionArity(usize),
    #[error("node {0:?} is not present in the document")]
    UnknownNode(NodeId),
    #[error("document has no root node")]
    NoRoot,

    // I/O failures.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DocumentError>;
