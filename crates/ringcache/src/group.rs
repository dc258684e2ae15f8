//! Cache group: a named namespace with its own cache and data source

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::byteview::ByteView;
use crate::error::{Error, Result};
use crate::getter::Getter;
use crate::lru::LruCache;
use crate::peers::PeerPicker;
use crate::stats::CacheStats;

/// Named cache namespace
///
/// A miss is served by the peer that owns the key when a picker is
/// registered, otherwise (or if that peer fails) by the local getter. Only
/// locally loaded values are cached here; a remote value stays cached on its
/// owner.
pub struct Group {
    name: String,
    getter: Box<dyn Getter>,
    cache: RwLock<LruCache<String, ByteView>>,
    stats: CacheStats,
    peers: RwLock<Option<Arc<dyn PeerPicker>>>,
}

impl Group {
    /// Create a group
    ///
    /// # Arguments
    /// * `name` - Group name, used in peer requests
    /// * `cache_bytes` - Local cache budget in bytes (`0` = unbounded)
    /// * `getter` - Source consulted when no peer owns the key
    pub fn new(name: impl Into<String>, cache_bytes: usize, getter: impl Getter + 'static) -> Self {
        Self {
            name: name.into(),
            getter: Box::new(getter),
            cache: RwLock::new(LruCache::new(cache_bytes)),
            stats: CacheStats::new(),
            peers: RwLock::new(None),
        }
    }

    /// Attach the peer picker; allowed once per group
    pub fn register_peers(&self, picker: Arc<dyn PeerPicker>) -> Result<()> {
        let mut peers = self.peers.write();
        if peers.is_some() {
            return Err(Error::PeersAlreadyRegistered(self.name.clone()));
        }
        *peers = Some(picker);
        Ok(())
    }

    /// Get a value, loading it on a miss
    pub async fn get(&self, key: &str) -> Result<ByteView> {
        if key.is_empty() {
            return Err(Error::EmptyKey);
        }

        if let Some(value) = self.lookup_cache(key) {
            self.stats.record_hit();
            debug!(group = %self.name, key, "cache hit");
            return Ok(value);
        }

        self.stats.record_miss();
        self.load(key).await
    }

    async fn load(&self, key: &str) -> Result<ByteView> {
        let peer = self
            .peers
            .read()
            .as_ref()
            .and_then(|picker| picker.pick_peer(key));

        if let Some(peer) = peer {
            match peer.get(&self.name, key).await {
                Ok(data) => {
                    self.stats.record_peer_load();
                    return Ok(ByteView::from(data));
                }
                Err(e) => {
                    self.stats.record_peer_error();
                    warn!(group = %self.name, key, error = %e, "peer fetch failed, loading locally");
                }
            }
        }

        self.load_locally(key)
    }

    fn load_locally(&self, key: &str) -> Result<ByteView> {
        let value = ByteView::from(self.getter.get(key)?);
        self.stats.record_local_load();
        debug!(group = %self.name, key, bytes = value.len(), "loaded from source");

        let evicted = self.cache.write().put(key.to_string(), value.clone());
        self.stats.record_evictions(evicted);
        Ok(value)
    }

    fn lookup_cache(&self, key: &str) -> Option<ByteView> {
        self.cache.write().get(key).cloned()
    }

    /// Group name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Group statistics
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Number of cached entries
    pub fn cache_len(&self) -> usize {
        self.cache.read().len()
    }

    /// Bytes currently cached
    pub fn cache_bytes(&self) -> usize {
        self.cache.read().used_bytes()
    }

    /// Cache byte budget
    pub fn max_bytes(&self) -> usize {
        self.cache.read().max_bytes()
    }

    /// Drop cached values and reset statistics
    pub fn clear_cache(&self) {
        self.cache.write().clear();
        self.stats.reset();
    }
}
