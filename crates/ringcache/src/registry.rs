//! Registry of named cache groups
//!
//! Owned by whoever serves requests (the HTTP layer in `ringd`) and passed
//! around explicitly; independent registries share nothing.

use std::collections::HashMap;
use std::sync::Arc;

use ahash::RandomState;
use parking_lot::RwLock;
use tracing::info;

use crate::error::{Error, Result};
use crate::getter::Getter;
use crate::group::Group;

/// Name -> group lookup table
#[derive(Default)]
pub struct GroupRegistry {
    groups: RwLock<HashMap<String, Arc<Group>, RandomState>>,
}

impl GroupRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a group and register it under its name
    pub fn create(
        &self,
        name: impl Into<String>,
        cache_bytes: usize,
        getter: impl Getter + 'static,
    ) -> Result<Arc<Group>> {
        self.insert(Group::new(name, cache_bytes, getter))
    }

    /// Register an existing group; names must be unique
    pub fn insert(&self, group: Group) -> Result<Arc<Group>> {
        let mut groups = self.groups.write();
        if groups.contains_key(group.name()) {
            return Err(Error::DuplicateGroup(group.name().to_string()));
        }

        let group = Arc::new(group);
        groups.insert(group.name().to_string(), Arc::clone(&group));
        info!(group = %group.name(), max_bytes = group.max_bytes(), "registered cache group");
        Ok(group)
    }

    /// Look up a group by name
    pub fn get(&self, name: &str) -> Option<Arc<Group>> {
        self.groups.read().get(name).cloned()
    }

    /// Unregister a group
    pub fn remove(&self, name: &str) -> Option<Arc<Group>> {
        self.groups.write().remove(name)
    }

    /// Registered group names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.groups.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of groups
    pub fn len(&self) -> usize {
        self.groups.read().len()
    }

    /// Check if no group is registered
    pub fn is_empty(&self) -> bool {
        self.groups.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo(key: &str) -> Result<Vec<u8>> {
        Ok(key.as_bytes().to_vec())
    }

    #[test]
    fn test_create_and_get() {
        let registry = GroupRegistry::new();
        let group = registry.create("scores", 1024, echo).unwrap();

        let found = registry.get("scores").unwrap();
        assert!(Arc::ptr_eq(&group, &found));
        assert!(registry.get("missing").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let registry = GroupRegistry::new();
        registry.create("scores", 0, echo).unwrap();

        let err = registry.create("scores", 0, echo).err().unwrap();
        assert_eq!(err, Error::DuplicateGroup("scores".to_string()));
    }

    #[test]
    fn test_registries_are_independent() {
        let a = GroupRegistry::new();
        let b = GroupRegistry::new();
        a.create("scores", 0, echo).unwrap();

        assert!(b.get("scores").is_none());
        b.create("scores", 0, echo).unwrap();
        assert_eq!(a.names(), b.names());
    }

    #[test]
    fn test_remove() {
        let registry = GroupRegistry::new();
        registry.create("a", 0, echo).unwrap();
        registry.create("b", 0, echo).unwrap();

        assert!(registry.remove("a").is_some());
        assert!(registry.remove("a").is_none());
        assert_eq!(registry.names(), vec!["b".to_string()]);
    }

    #[tokio::test]
    async fn test_group_served_through_registry() {
        let registry = GroupRegistry::new();
        registry.create("echo", 0, echo).unwrap();

        let group = registry.get("echo").unwrap();
        assert_eq!(group.get("hello").await.unwrap().to_string(), "hello");
    }
}
