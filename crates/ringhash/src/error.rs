//! Error types for ringhash

use std::fmt;

/// Result type alias for ring operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for ring construction and membership changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Replica count must be at least 1
    InvalidReplicas(usize),

    /// A virtual replica landed on a position owned by another node
    /// (only reported under [`CollisionPolicy::Reject`](crate::CollisionPolicy::Reject))
    Collision {
        /// Contested ring position
        position: u32,
        /// Node that already owns the position
        existing: String,
        /// Node that was being added
        node: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidReplicas(n) => {
                write!(f, "Invalid replica count: {} (must be at least 1)", n)
            }
            Error::Collision {
                position,
                existing,
                node,
            } => write!(
                f,
                "Ring position {} owned by {} collides with node {}",
                position, existing, node
            ),
        }
    }
}

impl std::error::Error for Error {}
