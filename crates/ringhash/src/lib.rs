//! # ringhash
//!
//! Consistent hash ring used to pick the peer responsible for a cache key.
//!
//! ## Design
//! - **Virtual replicas**: each node occupies `replicas` positions on a 32-bit ring
//! - **Lookup**: binary search over sorted positions, wrapping past the end (O(log n))
//! - **Locking**: many concurrent lookups, one writer at a time
//! - **Swapping**: [`SharedRing`] replaces the whole membership atomically

#![warn(missing_docs)]

mod config;
mod error;
mod ring;
mod shared;

pub use config::{default_hash, CollisionPolicy, HashFn, RingConfig, DEFAULT_REPLICAS};
pub use error::{Error, Result};
pub use ring::ConsistentHash;
pub use shared::SharedRing;
