//! Peer selection for cache groups
//!
//! A [`PeerPicker`] decides whether a key belongs to a remote peer and hands
//! back a [`PeerGetter`] able to fetch it. [`RingPeers`] is the consistent
//! hashing picker; the transport behind each getter is pluggable.

use std::collections::HashMap;
use std::sync::Arc;

use ahash::RandomState;
use async_trait::async_trait;
use parking_lot::RwLock;
use ringhash::{RingConfig, SharedRing};
use tracing::{debug, info};

use crate::error::Result;

/// Fetches values for a group from one remote peer
#[async_trait]
pub trait PeerGetter: Send + Sync {
    /// Fetch `key` from `group` on the peer
    async fn get(&self, group: &str, key: &str) -> Result<Vec<u8>>;
}

/// Chooses the peer that owns a key
pub trait PeerPicker: Send + Sync {
    /// Remote getter for `key`, or `None` when the key is owned locally
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>>;
}

/// Consistent-hash peer picker
///
/// Every peer (this node included) is placed on the ring. Keys that land on
/// this node resolve to `None`.
pub struct RingPeers {
    self_id: String,
    config: RingConfig,
    ring: SharedRing,
    getters: RwLock<HashMap<String, Arc<dyn PeerGetter>, RandomState>>,
}

impl RingPeers {
    /// Create a picker with no peers
    ///
    /// # Arguments
    /// * `self_id` - This node's identifier as it appears in the peer list
    /// * `config` - Ring parameters applied on every membership change
    pub fn new(self_id: impl Into<String>, config: RingConfig) -> Result<Self> {
        let ring = SharedRing::build(config, std::iter::empty::<&str>())?;

        Ok(Self {
            self_id: self_id.into(),
            config,
            ring,
            getters: RwLock::new(HashMap::with_hasher(RandomState::new())),
        })
    }

    /// Replace the full peer set
    ///
    /// `connect` builds the getter for each remote peer. The ring is rebuilt
    /// and swapped in whole; lookups racing the swap may fall back to a local
    /// load.
    pub fn set_peers<I, S, F>(&self, peers: I, connect: F) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: Fn(&str) -> Arc<dyn PeerGetter>,
    {
        let peers: Vec<String> = peers.into_iter().map(|p| p.as_ref().to_string()).collect();

        let mut getters = HashMap::with_hasher(RandomState::new());
        for peer in peers.iter().filter(|p| **p != self.self_id) {
            getters.insert(peer.clone(), connect(peer));
        }

        let mut current = self.getters.write();
        self.ring.rebuild(self.config, &peers)?;
        *current = getters;

        info!(peers = peers.len(), self_id = %self.self_id, "peer set updated");
        Ok(())
    }

    /// Owner of `key` on the current ring
    pub fn owner(&self, key: &str) -> Option<String> {
        self.ring.get(key)
    }

    /// Current peer identifiers, sorted
    pub fn peers(&self) -> Vec<String> {
        self.ring.load().nodes()
    }

    /// This node's identifier
    pub fn self_id(&self) -> &str {
        &self.self_id
    }
}

impl PeerPicker for RingPeers {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>> {
        let owner = self.ring.get(key)?;
        if owner == self.self_id {
            return None;
        }

        debug!(peer = %owner, key, "picked peer");
        self.getters.read().get(&owner).cloned()
    }
}
