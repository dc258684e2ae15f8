//! Ring configuration

/// Hash function mapping bytes onto the 32-bit ring
pub type HashFn = fn(&[u8]) -> u32;

/// Replica count used by [`RingConfig::default`]
pub const DEFAULT_REPLICAS: usize = 50;

/// Default ring hash: CRC-32 (IEEE)
pub fn default_hash(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

/// What to do when a virtual replica lands on a position already owned by a
/// different node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// Later node takes the position (last writer wins)
    #[default]
    Overwrite,
    /// Refuse the later node and leave the ring unchanged
    Reject,
}

/// Construction parameters for a [`ConsistentHash`](crate::ConsistentHash)
#[derive(Debug, Clone, Copy)]
pub struct RingConfig {
    /// Virtual replicas per real node
    pub replicas: usize,

    /// Collision handling between different nodes
    pub collision_policy: CollisionPolicy,

    /// Ring hash; `None` selects [`default_hash`]
    pub hash: Option<HashFn>,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            replicas: DEFAULT_REPLICAS,
            collision_policy: CollisionPolicy::default(),
            hash: None,
        }
    }
}

impl RingConfig {
    /// Set the replica count
    pub fn with_replicas(mut self, replicas: usize) -> Self {
        self.replicas = replicas;
        self
    }

    /// Set the collision policy
    pub fn with_collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.collision_policy = policy;
        self
    }

    /// Use a custom hash function
    pub fn with_hash(mut self, hash: HashFn) -> Self {
        self.hash = Some(hash);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RingConfig::default();
        assert_eq!(config.replicas, DEFAULT_REPLICAS);
        assert_eq!(config.collision_policy, CollisionPolicy::Overwrite);
        assert!(config.hash.is_none());
    }

    #[test]
    fn test_default_hash_is_crc32() {
        // CRC-32/IEEE check value
        assert_eq!(default_hash(b"123456789"), 0xCBF4_3926);
    }
}
