//! HTTP client side of the peer protocol

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use ringcache::{Error, PeerGetter, Result};
use tracing::debug;

/// Upper bound on one peer request, connect through body
pub const DEFAULT_PEER_TIMEOUT: Duration = Duration::from_secs(5);

/// Build the client shared by all peer getters of a pool
pub fn peer_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| Error::Peer(format!("building http client: {}", e)))
}

/// Fetches group values from one remote peer over HTTP
///
/// Requests `GET {base_url}{group}/{key}`; the body is the raw value.
pub struct HttpGetter {
    client: Client,
    base_url: String,
}

impl HttpGetter {
    /// `base_url` is the peer address joined with the pool's base path,
    /// e.g. `http://10.0.0.2:8001/_ringcache/`
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url(&self, group: &str, key: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| Error::Peer(format!("invalid peer url {}: {}", self.base_url, e)))?;

        url.path_segments_mut()
            .map_err(|_| Error::Peer(format!("peer url cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .push(group)
            .push(key);

        Ok(url)
    }
}

#[async_trait]
impl PeerGetter for HttpGetter {
    async fn get(&self, group: &str, key: &str) -> Result<Vec<u8>> {
        let url = self.url(group, key)?;
        debug!(%url, "fetching from peer");

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Peer(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(Error::Peer(format!("server returned: {}", resp.status())));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| Error::Peer(format!("reading response body: {}", e)))?;

        Ok(body.to_vec())
    }
}
