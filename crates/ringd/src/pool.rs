//! HTTP peer pool: ring membership plus one HTTP client per peer

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use ringcache::{PeerGetter, PeerPicker, Result, RingPeers};
use ringhash::RingConfig;

use crate::client::{peer_client, HttpGetter};

/// Base path served by every peer
pub const DEFAULT_BASE_PATH: &str = "/_ringcache/";

/// This node's view of the cluster
///
/// Peers are identified by their base URL (e.g. `http://10.0.0.2:8001`);
/// this node must appear in the peer list under `self_url`.
pub struct HttpPool {
    self_url: String,
    base_path: String,
    peers: RingPeers,
    client: Client,
}

impl HttpPool {
    /// Create a pool with no peers
    ///
    /// `timeout` bounds every request made to a remote peer.
    pub fn new(
        self_url: impl Into<String>,
        base_path: &str,
        config: RingConfig,
        timeout: Duration,
    ) -> Result<Self> {
        let self_url = trim_url(&self_url.into());

        Ok(Self {
            peers: RingPeers::new(self_url.clone(), config)?,
            self_url,
            base_path: normalize_base_path(base_path),
            client: peer_client(timeout)?,
        })
    }

    /// Replace the peer set; the ring is rebuilt and swapped atomically
    pub fn set_peers<I, S>(&self, peers: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let peers: Vec<String> = peers.into_iter().map(|p| trim_url(p.as_ref())).collect();

        self.peers.set_peers(&peers, |peer| -> Arc<dyn PeerGetter> {
            Arc::new(HttpGetter::new(
                self.client.clone(),
                format!("{}{}", peer, self.base_path),
            ))
        })
    }

    /// Peer owning `key` on the current ring
    pub fn owner(&self, key: &str) -> Option<String> {
        self.peers.owner(key)
    }

    /// Current peers, sorted
    pub fn peers(&self) -> Vec<String> {
        self.peers.peers()
    }

    /// This node's URL
    pub fn self_url(&self) -> &str {
        &self.self_url
    }

    /// Path prefix of the peer endpoint, with leading and trailing `/`
    pub fn base_path(&self) -> &str {
        &self.base_path
    }
}

impl PeerPicker for HttpPool {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>> {
        self.peers.pick_peer(key)
    }
}

fn trim_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

fn normalize_base_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", trimmed)
    }
}
