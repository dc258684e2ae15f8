//! Demo data source standing in for a slow backing database

use ringcache::{Error, Result};
use tracing::info;

const SCORES: [(&str, &str); 3] = [("Tom", "123"), ("Jack", "456"), ("Sam", "789")];

/// Look up `key` in the demo score table
pub fn slow_db(key: &str) -> Result<Vec<u8>> {
    info!(key, "[SlowDB] search key");
    SCORES
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.as_bytes().to_vec())
        .ok_or_else(|| Error::NotFound(key.to_string()))
}
