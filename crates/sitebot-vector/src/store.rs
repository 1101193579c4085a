use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::info;

use sitebot_core::{Error, Result};

use crate::collection::MemoryCollection;

pub type CollectionHandle = Arc<MemoryCollection>;

/// Owner of all named collections for the lifetime of the hosting process.
#[derive(Default)]
pub struct MemoryVectorStore {
    collections: RwLock<HashMap<String, CollectionHandle>>,
}

impl MemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a collection; fails if one with `name` already exists.
    pub fn create_collection(&self, name: &str) -> Result<CollectionHandle> {
        if name.trim().is_empty() {
            return Err(Error::InvalidConfiguration("collection name must not be empty".to_string()));
        }
        let mut collections = self.collections.write().unwrap_or_else(|e| e.into_inner());
        if collections.contains_key(name) {
            return Err(Error::DuplicateCollection(name.to_string()));
        }
        let handle = Arc::new(MemoryCollection::new(name));
        collections.insert(name.to_string(), Arc::clone(&handle));
        info!(collection = name, "created collection");
        Ok(handle)
    }

    pub fn collection(&self, name: &str) -> Option<CollectionHandle> {
        self.collections.read().unwrap_or_else(|e| e.into_inner()).get(name).cloned()
    }

    pub fn get_or_create_collection(&self, name: &str) -> Result<CollectionHandle> {
        if let Some(existing) = self.collection(name) {
            return Ok(existing);
        }
        match self.create_collection(name) {
            Err(Error::DuplicateCollection(_)) => self
                .collection(name)
                .ok_or_else(|| Error::DuplicateCollection(name.to_string())),
            other => other,
        }
    }

    pub fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.read().unwrap_or_else(|e| e.into_inner()).keys().cloned().collect();
        names.sort();
        names
    }
}
