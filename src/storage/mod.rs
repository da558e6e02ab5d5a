//! Cache storage abstraction
//!
//! Provides traits for the generation-scoped cache store so different
//! backends (in-process memory, disk, browser-managed storage) can be
//! plugged into the gateway.

pub mod memory;

pub use memory::MemoryStorage;

use crate::error::GatewayResult;
use crate::http::{RequestKey, Response};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// A stored response together with when it was written
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub response: Response,
    pub stored_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Wrap a response, stamped now
    pub fn new(response: Response) -> Self {
        Self {
            response,
            stored_at: Utc::now(),
        }
    }
}

/// Abstract storage subsystem holding one store per generation
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Open the store for a generation, creating it if absent
    async fn open(&self, generation: &str) -> GatewayResult<Arc<dyn CacheStore>>;

    /// Enumerate all generation names currently held
    async fn generations(&self) -> GatewayResult<Vec<String>>;

    /// Delete an entire generation and all its entries.
    /// Returns whether the generation existed.
    async fn delete(&self, generation: &str) -> GatewayResult<bool>;
}

/// One generation's key-value store of responses
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Look up the stored response for a key
    async fn lookup(&self, key: &RequestKey) -> GatewayResult<Option<Response>>;

    /// Store a response under a key, overwriting any previous entry.
    ///
    /// Consumes the response: callers that still need to reply with it
    /// must clone before calling (the body is `Bytes`, so the clone is
    /// a reference-count bump).
    async fn put(&self, key: RequestKey, response: Response) -> GatewayResult<()>;

    /// Whether an entry exists for a key
    async fn contains(&self, key: &RequestKey) -> GatewayResult<bool>;
}
