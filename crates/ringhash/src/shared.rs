//! Swappable ring handle for whole-membership updates

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::config::RingConfig;
use crate::error::Result;
use crate::ring::ConsistentHash;

/// Shared reference to the live ring
///
/// Membership changes that must appear atomically to readers build a fresh
/// [`ConsistentHash`] and swap it in. Readers holding an earlier snapshot
/// from [`SharedRing::load`] keep seeing the old membership.
#[derive(Debug)]
pub struct SharedRing {
    current: RwLock<Arc<ConsistentHash>>,
}

impl SharedRing {
    /// Wrap an existing ring
    pub fn new(ring: ConsistentHash) -> Self {
        Self {
            current: RwLock::new(Arc::new(ring)),
        }
    }

    /// Build a ring with the given membership and wrap it
    pub fn build<I, S>(config: RingConfig, nodes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self::new(populated(config, nodes)?))
    }

    /// Snapshot of the live ring
    pub fn load(&self) -> Arc<ConsistentHash> {
        Arc::clone(&self.current.read())
    }

    /// Look up `key` on the live ring
    pub fn get(&self, key: &str) -> Option<String> {
        self.load().get(key)
    }

    /// Replace the live ring, returning the previous one
    pub fn swap(&self, ring: ConsistentHash) -> Arc<ConsistentHash> {
        let next = Arc::new(ring);
        let mut current = self.current.write();
        std::mem::replace(&mut *current, next)
    }

    /// Rebuild the ring from the full desired membership and swap it in
    ///
    /// On error the live ring is left untouched.
    pub fn rebuild<I, S>(&self, config: RingConfig, nodes: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ring = populated(config, nodes)?;
        let nodes = ring.len();
        let previous = self.swap(ring);
        debug!(nodes, previous = previous.len(), "swapped ring membership");
        Ok(())
    }
}

fn populated<I, S>(config: RingConfig, nodes: I) -> Result<ConsistentHash>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let ring = ConsistentHash::with_config(config)?;
    ring.add_nodes(nodes)?;
    Ok(ring)
}
