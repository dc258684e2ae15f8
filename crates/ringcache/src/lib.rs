//! # ringcache
//!
//! Named cache groups for a distributed key/value cache.
//!
//! ## Architecture
//! - **Group**: per-namespace LRU cache (byte budget) over a local [`Getter`]
//! - **Peers**: [`RingPeers`] routes misses to the owning peer via `ringhash`
//! - **Registry**: explicit [`GroupRegistry`] instead of a process-wide table
//! - **Transport**: any [`PeerGetter`] (HTTP lives in `ringd`)

#![warn(missing_docs)]

mod byteview;
mod error;
mod getter;
mod group;
mod lru;
mod peers;
mod registry;
mod stats;

pub use byteview::ByteView;
pub use error::{Error, Result};
pub use getter::Getter;
pub use group::Group;
pub use peers::{PeerGetter, PeerPicker, RingPeers};
pub use registry::GroupRegistry;
pub use stats::CacheStats;
