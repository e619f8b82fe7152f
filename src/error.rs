//! Error types for tree operations.

/// A specialized Result type for tree operations.
pub type Result<T> = std::result::Result<T, TreeError>;

/// Errors reported by the engine and the container facades.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// A checked lookup (`at`) found no element with the requested key.
    #[error("key not found")]
    KeyNotFound,

    /// The cursor is the end position and does not refer to an element.
    #[error("cursor is at the end position")]
    EndCursor,

    /// The cursor refers to a node that has since been removed, or to a
    /// duplicate offset the node no longer holds.
    #[error("cursor refers to a removed element")]
    StaleCursor,

    /// Node storage could not grow.
    #[error("failed to reserve space for {additional} more nodes")]
    AllocFailed {
        /// Number of nodes the operation tried to reserve.
        additional: usize,
    },
}
