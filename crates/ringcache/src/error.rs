//! Error types for ringcache

use std::fmt;

/// Result type alias for cache operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for cache group operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Empty keys are not cacheable
    EmptyKey,

    /// Key not found in the backing source
    NotFound(String),

    /// Backing source failed
    Load(String),

    /// Remote peer fetch failed
    Peer(String),

    /// Group already has a peer picker
    PeersAlreadyRegistered(String),

    /// A group with this name already exists in the registry
    DuplicateGroup(String),

    /// Ring configuration or membership error
    Ring(ringhash::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptyKey => write!(f, "Key is required"),
            Error::NotFound(key) => write!(f, "{} not exist", key),
            Error::Load(msg) => write!(f, "Load error: {}", msg),
            Error::Peer(msg) => write!(f, "Peer error: {}", msg),
            Error::PeersAlreadyRegistered(group) => {
                write!(f, "Peers already registered for group {}", group)
            }
            Error::DuplicateGroup(group) => write!(f, "Group {} already exists", group),
            Error::Ring(e) => write!(f, "Ring error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Ring(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ringhash::Error> for Error {
    fn from(err: ringhash::Error) -> Self {
        Error::Ring(err)
    }
}
