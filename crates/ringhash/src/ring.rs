//! Consistent hash ring implementation
//!
//! Every real node is expanded into `replicas` virtual positions on a 32-bit
//! ring. Position `i` of node `n` is `hash("{i}{n}")`. A key belongs to the
//! first position at or after `hash(key)`, wrapping to the smallest position.

use std::collections::{BTreeSet, HashMap};

use ahash::RandomState;
use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::config::{default_hash, CollisionPolicy, HashFn, RingConfig};
use crate::error::{Error, Result};

/// Mutable ring contents, guarded by a single lock
#[derive(Debug, Default)]
struct RingState {
    /// Sorted, deduplicated ring positions
    positions: Vec<u32>,

    /// Position -> owning node
    owners: HashMap<u32, String, RandomState>,

    /// Real nodes currently registered
    members: BTreeSet<String>,
}

/// Consistent hash ring mapping keys to node identifiers
///
/// Lookups take a shared lock, membership changes take an exclusive one, so
/// a lookup never observes a half-inserted node or an unsorted position set.
#[derive(Debug)]
pub struct ConsistentHash {
    hash: HashFn,
    replicas: usize,
    collision_policy: CollisionPolicy,
    state: RwLock<RingState>,
}

impl ConsistentHash {
    /// Create an empty ring
    ///
    /// # Arguments
    /// * `replicas` - Virtual replicas per node, must be at least 1
    /// * `hash` - Ring hash, CRC-32 when `None`
    pub fn new(replicas: usize, hash: Option<HashFn>) -> Result<Self> {
        Self::with_config(RingConfig {
            replicas,
            hash,
            ..RingConfig::default()
        })
    }

    /// Create an empty ring from a full configuration
    pub fn with_config(config: RingConfig) -> Result<Self> {
        if config.replicas == 0 {
            return Err(Error::InvalidReplicas(config.replicas));
        }

        Ok(Self {
            hash: config.hash.unwrap_or(default_hash),
            replicas: config.replicas,
            collision_policy: config.collision_policy,
            state: RwLock::new(RingState::default()),
        })
    }

    /// Register a node and its virtual replicas
    ///
    /// Adding a node twice yields the same positions. Under
    /// [`CollisionPolicy::Reject`] a node whose positions clash with another
    /// node is refused as a whole.
    pub fn add_node(&self, node: &str) -> Result<()> {
        let positions = self.positions_for(node);
        let mut state = self.state.write();

        if self.collision_policy == CollisionPolicy::Reject {
            for &position in &positions {
                if let Some(existing) = state.owners.get(&position) {
                    if existing != node {
                        return Err(Error::Collision {
                            position,
                            existing: existing.clone(),
                            node: node.to_string(),
                        });
                    }
                }
            }
        }

        for position in positions {
            match state.owners.insert(position, node.to_string()) {
                None => state.positions.push(position),
                Some(previous) if previous != node => {
                    warn!(position, %previous, node, "ring position overwritten");
                }
                Some(_) => {}
            }
        }

        state.positions.sort_unstable();
        state.members.insert(node.to_string());
        debug!(node, replicas = self.replicas, "added node to ring");
        Ok(())
    }

    /// Register several nodes in order
    ///
    /// Each node is added atomically; the batch as a whole is not. Stops at
    /// the first rejected node.
    pub fn add_nodes<I, S>(&self, nodes: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for node in nodes {
            self.add_node(node.as_ref())?;
        }
        Ok(())
    }

    /// Remove a node and every position it still owns
    ///
    /// Positions that were overwritten by another node stay with that node.
    /// A freed position that another remaining node also hashes to goes back
    /// to that node (first in sorted order). Returns `false` if the node was
    /// not registered.
    pub fn remove_node(&self, node: &str) -> bool {
        let positions = self.positions_for(node);
        let mut state = self.state.write();

        if !state.members.remove(node) {
            return false;
        }

        let mut freed = Vec::new();
        for position in positions {
            if state.owners.get(&position).is_some_and(|owner| owner == node) {
                state.owners.remove(&position);
                freed.push(position);
            }
        }

        let RingState {
            positions,
            owners,
            members,
        } = &mut *state;

        if !freed.is_empty() {
            for member in members.iter() {
                for position in self.positions_for(member) {
                    if freed.contains(&position) && !owners.contains_key(&position) {
                        debug!(position, node = %member, "ring position reclaimed");
                        owners.insert(position, member.clone());
                    }
                }
            }
        }

        positions.retain(|position| owners.contains_key(position));

        debug!(node, "removed node from ring");
        true
    }

    /// Find the node responsible for `key`
    ///
    /// Returns `None` only when the ring has no positions.
    pub fn get(&self, key: &str) -> Option<String> {
        let state = self.state.read();
        if state.positions.is_empty() {
            return None;
        }

        let target = (self.hash)(key.as_bytes());
        let idx = state.positions.partition_point(|&position| position < target);
        let position = state.positions[idx % state.positions.len()];

        state.owners.get(&position).cloned()
    }

    /// Number of registered real nodes
    pub fn len(&self) -> usize {
        self.state.read().members.len()
    }

    /// Check if no node is registered
    pub fn is_empty(&self) -> bool {
        self.state.read().members.is_empty()
    }

    /// Number of occupied ring positions
    pub fn position_count(&self) -> usize {
        self.state.read().positions.len()
    }

    /// Check if a node is registered
    pub fn contains(&self, node: &str) -> bool {
        self.state.read().members.contains(node)
    }

    /// Registered nodes, sorted
    pub fn nodes(&self) -> Vec<String> {
        self.state.read().members.iter().cloned().collect()
    }

    /// Virtual replicas per node
    pub fn replicas(&self) -> usize {
        self.replicas
    }

    /// Configured collision policy
    pub fn collision_policy(&self) -> CollisionPolicy {
        self.collision_policy
    }

    fn positions_for(&self, node: &str) -> Vec<u32> {
        (0..self.replicas)
            .map(|i| (self.hash)(format!("{}{}", i, node).as_bytes()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    /// Interprets the input as a decimal number
    fn decimal_hash(data: &[u8]) -> u32 {
        std::str::from_utf8(data)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0)
    }

    fn decimal_ring(replicas: usize) -> ConsistentHash {
        ConsistentHash::new(replicas, Some(decimal_hash)).unwrap()
    }

    #[test]
    fn test_lookup_and_wraparound() {
        let ring = decimal_ring(3);
        ring.add_nodes(["2", "4", "6"]).unwrap();

        // 2, 4, 6, 12, 14, 16, 22, 24, 26
        let cases = [("2", "2"), ("11", "2"), ("23", "4"), ("27", "2")];
        for (key, node) in cases {
            assert_eq!(ring.get(key).as_deref(), Some(node), "key {}", key);
        }

        ring.add_node("8").unwrap();

        let cases = [("2", "2"), ("11", "2"), ("23", "4"), ("27", "8")];
        for (key, node) in cases {
            assert_eq!(ring.get(key).as_deref(), Some(node), "key {}", key);
        }
    }

    #[test]
    fn test_empty_ring_returns_none() {
        let ring = ConsistentHash::new(10, None).unwrap();
        assert!(ring.is_empty());
        for key in ["", "a", "Tom", "some/long/key"] {
            assert_eq!(ring.get(key), None);
        }
    }

    #[test]
    fn test_zero_replicas_rejected() {
        let err = ConsistentHash::new(0, None).unwrap_err();
        assert_eq!(err, Error::InvalidReplicas(0));
    }

    #[test]
    fn test_populated_ring_always_answers() {
        let ring = ConsistentHash::new(5, None).unwrap();
        ring.add_node("peer-a").unwrap();

        for i in 0..1000 {
            assert_eq!(ring.get(&format!("key-{}", i)).as_deref(), Some("peer-a"));
        }
    }

    #[test]
    fn test_lookup_is_deterministic() {
        let ring = ConsistentHash::new(50, None).unwrap();
        ring.add_nodes(["10.0.0.1:8001", "10.0.0.2:8001", "10.0.0.3:8001"])
            .unwrap();

        let other = ConsistentHash::new(50, None).unwrap();
        other
            .add_nodes(["10.0.0.3:8001", "10.0.0.1:8001", "10.0.0.2:8001"])
            .unwrap();

        for i in 0..500 {
            let key = format!("key-{}", i);
            let first = ring.get(&key);
            assert_eq!(first, ring.get(&key));
            assert_eq!(first, other.get(&key), "insertion order changed {}", key);
        }
    }

    #[test]
    fn test_add_node_twice_is_idempotent() {
        let ring = decimal_ring(3);
        ring.add_node("2").unwrap();
        ring.add_node("2").unwrap();

        assert_eq!(ring.len(), 1);
        assert_eq!(ring.position_count(), 3);
    }

    #[test]
    fn test_adding_node_only_moves_keys_to_it() {
        let ring = ConsistentHash::new(100, None).unwrap();
        ring.add_nodes(["a", "b", "c"]).unwrap();

        let keys: Vec<String> = (0..5000).map(|i| format!("key-{}", i)).collect();
        let before: Vec<_> = keys.iter().map(|k| ring.get(k)).collect();

        ring.add_node("d").unwrap();

        let mut moved = 0;
        for (key, old) in keys.iter().zip(before) {
            let new = ring.get(key);
            if new != old {
                assert_eq!(new.as_deref(), Some("d"), "key {} moved between old nodes", key);
                moved += 1;
            }
        }
        assert!(moved > 0);
    }

    #[test]
    fn test_remove_node_restores_other_keys() {
        let ring = ConsistentHash::new(100, None).unwrap();
        ring.add_nodes(["a", "b", "c"]).unwrap();

        let keys: Vec<String> = (0..5000).map(|i| format!("key-{}", i)).collect();
        let before: Vec<_> = keys.iter().map(|k| ring.get(k)).collect();

        assert!(ring.remove_node("b"));
        assert!(!ring.contains("b"));
        assert_eq!(ring.len(), 2);

        for (key, old) in keys.iter().zip(before) {
            let new = ring.get(key);
            assert_ne!(new.as_deref(), Some("b"));
            if old.as_deref() != Some("b") {
                assert_eq!(new, old, "key {} should not move", key);
            }
        }
    }

    #[test]
    fn test_remove_last_node_empties_ring() {
        let ring = decimal_ring(3);
        ring.add_node("2").unwrap();
        assert!(ring.remove_node("2"));

        assert!(ring.is_empty());
        assert_eq!(ring.position_count(), 0);
        assert_eq!(ring.get("11"), None);
        assert!(!ring.remove_node("2"));
    }

    #[test]
    fn test_collision_overwrite() {
        let ring = decimal_ring(2);
        ring.add_node("2").unwrap(); // 2, 12
        ring.add_node("12").unwrap(); // 12, 112

        assert_eq!(ring.position_count(), 3);
        assert_eq!(ring.get("11").as_deref(), Some("12"));
        assert_eq!(ring.get("1").as_deref(), Some("2"));

        // "2" keeps position 2, and position 12 stays with "12"
        assert!(ring.remove_node("2"));
        assert_eq!(ring.get("11").as_deref(), Some("12"));
        assert_eq!(ring.position_count(), 2);
    }

    #[test]
    fn test_remove_returns_shared_position_to_survivor() {
        let ring = decimal_ring(1);
        ring.add_node("2").unwrap(); // "02" -> 2
        ring.add_node("02").unwrap(); // "002" -> 2, takes it over

        assert_eq!(ring.position_count(), 1);
        assert_eq!(ring.get("1").as_deref(), Some("02"));

        assert!(ring.remove_node("02"));
        assert_eq!(ring.len(), 1);
        assert!(!ring.is_empty());
        assert_eq!(ring.position_count(), 1);
        assert_eq!(ring.get("1").as_deref(), Some("2"));
        assert_eq!(ring.get("7").as_deref(), Some("2"));

        assert!(ring.remove_node("2"));
        assert!(ring.is_empty());
        assert_eq!(ring.get("1"), None);
    }

    #[test]
    fn test_collision_reject() {
        let config = RingConfig::default()
            .with_replicas(2)
            .with_hash(decimal_hash)
            .with_collision_policy(CollisionPolicy::Reject);
        let ring = ConsistentHash::with_config(config).unwrap();
        ring.add_node("2").unwrap();

        let err = ring.add_node("12").unwrap_err();
        assert_eq!(
            err,
            Error::Collision {
                position: 12,
                existing: "2".to_string(),
                node: "12".to_string(),
            }
        );
        assert_eq!(ring.len(), 1);
        assert_eq!(ring.position_count(), 2);
        assert_eq!(ring.get("11").as_deref(), Some("2"));

        // Re-adding the owner is not a collision
        ring.add_node("2").unwrap();
    }

    #[test]
    fn test_load_spread() {
        let ring = ConsistentHash::new(160, None).unwrap();
        let nodes = ["peer-1", "peer-2", "peer-3", "peer-4"];
        ring.add_nodes(nodes).unwrap();

        let total = 40_000;
        let mut counts: HashMap<String, usize> = HashMap::new();
        for i in 0..total {
            let node = ring.get(&format!("user:{}", i)).unwrap();
            *counts.entry(node).or_default() += 1;
        }

        assert_eq!(counts.len(), nodes.len());
        for (node, count) in counts {
            let share = count as f64 / total as f64;
            assert!(
                (0.15..=0.35).contains(&share),
                "node {} got {:.3} of keys",
                node,
                share
            );
        }
    }

    #[test]
    fn test_concurrent_lookups_during_growth() {
        let ring = Arc::new(ConsistentHash::new(20, None).unwrap());
        ring.add_node("seed").unwrap();

        thread::scope(|s| {
            for t in 0..4 {
                let ring = Arc::clone(&ring);
                s.spawn(move || {
                    for i in 0..2000 {
                        assert!(ring.get(&format!("{}-{}", t, i)).is_some());
                    }
                });
            }
            let ring = Arc::clone(&ring);
            s.spawn(move || {
                for i in 0..50 {
                    ring.add_node(&format!("node-{}", i)).unwrap();
                }
            });
        });

        assert_eq!(ring.len(), 51);
    }
}
