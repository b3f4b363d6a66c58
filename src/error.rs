//! Error types for network loading and manipulation.
//!
//! Loading is all-or-nothing: any of these errors aborts the load and leaves
//! the previously installed network untouched.

use thiserror::Error;

/// Errors raised while building or driving a [`crate::network::Network`].
#[derive(Error, Debug)]
pub enum NetworkError {
    /// The input document is structurally unusable (missing or empty
    /// top-level array, unparseable community id, ...).
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A similarity record lacks one of its required fields. Fatal for the
    /// whole edge set, not just the offending record.
    #[error("malformed similarity record #{index}: missing field `{field}`")]
    MalformedEdge {
        /// Position of the record in the `similarities` array.
        index: usize,
        /// Name of the missing field.
        field: &'static str,
    },

    /// A configuration document is not valid JSON or fails to decode.
    /// Unparseable network documents are reported as `MalformedInput`.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A node id was referenced that the network does not contain.
    #[error("unknown node `{0}`")]
    UnknownNode(String),

    /// A dimension binding named an attribute key that was never observed.
    #[error("unknown explicit community `{0}`")]
    UnknownCommunityKey(String),
}

/// Result type for network operations.
pub type NetworkResult<T> = Result<T, NetworkError>;
