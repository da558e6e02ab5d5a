//! In-process cache storage backend
//!
//! Generations are held in a shared map; each store is an `Arc` so a
//! handle opened before a generation is deleted keeps working until
//! dropped, matching the open-handle semantics of browser-managed caches.

use crate::error::GatewayResult;
use crate::http::{RequestKey, Response};
use crate::storage::{CacheEntry, CacheStorage, CacheStore};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// In-memory storage subsystem
#[derive(Default)]
pub struct MemoryStorage {
    generations: RwLock<HashMap<String, Arc<MemoryStore>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStorage for MemoryStorage {
    async fn open(&self, generation: &str) -> GatewayResult<Arc<dyn CacheStore>> {
        let mut generations = self.generations.write().await;
        let store = generations
            .entry(generation.to_string())
            .or_insert_with(|| {
                debug!(generation, "Creating cache store");
                Arc::new(MemoryStore::default())
            });
        Ok(Arc::clone(store) as Arc<dyn CacheStore>)
    }

    async fn generations(&self) -> GatewayResult<Vec<String>> {
        let generations = self.generations.read().await;
        Ok(generations.keys().cloned().collect())
    }

    async fn delete(&self, generation: &str) -> GatewayResult<bool> {
        let mut generations = self.generations.write().await;
        Ok(generations.remove(generation).is_some())
    }
}

/// One generation's entries
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<RequestKey, CacheEntry>>,
}

impl MemoryStore {
    /// Number of entries currently stored
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn lookup(&self, key: &RequestKey) -> GatewayResult<Option<Response>> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).map(|e| e.response.clone()))
    }

    async fn put(&self, key: RequestKey, response: Response) -> GatewayResult<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key, CacheEntry::new(response));
        Ok(())
    }

    async fn contains(&self, key: &RequestKey) -> GatewayResult<bool> {
        let entries = self.entries.read().await;
        Ok(entries.contains_key(key))
    }
}
