//! The cache gateway
//!
//! Owns one named cache generation and applies the serving policy:
//! pre-warm on install, delete stale generations on activate, serve
//! intercepted requests cache-first with network fallback, and answer
//! failed navigations with the cached fallback document.

use crate::config::Config;
use crate::error::{GatewayError, GatewayResult};
use crate::generation::GenerationId;
use crate::http::{Method, Request, RequestKey, RequestMode, Response};
use crate::network::NetworkClient;
use crate::runtime::HostRuntime;
use crate::storage::{CacheStorage, CacheStore};
use futures_util::future::{join_all, try_join_all};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Message type value that forces immediate generation takeover
pub const FORCE_ACTIVATION: &str = "SKIP_WAITING";

/// Inbound control message shape
#[derive(Debug, Deserialize)]
struct ControlMessage {
    #[serde(rename = "type")]
    kind: String,
}

/// Where a served response came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServedFrom {
    Cache,
    Network,
    Fallback,
}

/// A served response and its provenance
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub response: Response,
    pub served_from: ServedFrom,
}

/// Cache gateway over injected storage, network, and runtime handles
pub struct Gateway {
    generation: GenerationId,
    manifest: Vec<String>,
    fallback: RequestKey,
    storage: Arc<dyn CacheStorage>,
    network: Arc<dyn NetworkClient>,
    host: Arc<dyn HostRuntime>,
}

impl Gateway {
    /// Build a gateway from validated configuration and injected handles
    pub fn new(
        config: &Config,
        storage: Arc<dyn CacheStorage>,
        network: Arc<dyn NetworkClient>,
        host: Arc<dyn HostRuntime>,
    ) -> GatewayResult<Self> {
        config.validate()?;

        Ok(Self {
            generation: config.generation_id()?,
            manifest: config.cache.manifest.clone(),
            fallback: RequestKey::get(config.cache.fallback_document.clone()),
            storage,
            network,
            host,
        })
    }

    /// The generation this gateway serves from
    pub fn generation(&self) -> &GenerationId {
        &self.generation
    }

    /// Open the current generation's store
    async fn store(&self) -> GatewayResult<Arc<dyn CacheStore>> {
        self.storage.open(&self.generation.as_store_name()).await
    }

    /// Install: pre-warm the current generation from the manifest.
    ///
    /// All manifest entries are fetched concurrently; a single failure
    /// (connectivity or non-200) fails the whole install so the host can
    /// retry later. Completes by signalling immediate-takeover intent.
    pub async fn install(&self) -> GatewayResult<()> {
        info!(generation = %self.generation, "Installing gateway");

        let store = self.store().await?;
        try_join_all(
            self.manifest
                .iter()
                .map(|path| self.prewarm_entry(&store, path)),
        )
        .await?;

        info!(
            generation = %self.generation,
            entries = self.manifest.len(),
            "Install complete"
        );

        self.host.skip_waiting().await
    }

    async fn prewarm_entry(&self, store: &Arc<dyn CacheStore>, path: &str) -> GatewayResult<()> {
        let request = Request::get(path);
        let response =
            self.network
                .fetch(&request)
                .await
                .map_err(|e| GatewayError::PrewarmFetch {
                    path: path.to_string(),
                    reason: e.to_string(),
                })?;

        if !response.is_success() {
            return Err(GatewayError::PrewarmStatus {
                path: path.to_string(),
                status: response.status,
            });
        }

        debug!(path, "Pre-warmed manifest entry");
        store.put(request.key(), response).await
    }

    /// Activate: delete every generation other than the current one, then
    /// claim all open consumers.
    ///
    /// Deletions run concurrently and are awaited before the claim signal
    /// so no consumer observes a stale generation. Cleanup failures are
    /// logged, not fatal; stale generations merely waste space.
    pub async fn activate(&self) -> GatewayResult<()> {
        info!(generation = %self.generation, "Activating gateway");

        let current = self.generation.as_store_name();
        match self.storage.generations().await {
            Ok(names) => {
                let stale: Vec<String> =
                    names.into_iter().filter(|name| *name != current).collect();

                join_all(stale.iter().map(|name| async move {
                    match self.storage.delete(name).await {
                        Ok(true) => info!(generation = %name, "Deleted old generation"),
                        Ok(false) => {}
                        Err(e) => warn!(generation = %name, error = %e, "Failed to delete old generation"),
                    }
                }))
                .await;
            }
            Err(e) => warn!(error = %e, "Failed to enumerate generations, skipping cleanup"),
        }

        self.host.claim_clients().await
    }

    /// Handle an intercepted request.
    ///
    /// Cache-first: a stored entry is returned without any network access
    /// or freshness check. On a miss the network is tried; successful GET
    /// responses are written back in the background. When the network is
    /// unreachable, navigation requests fall back to the cached fallback
    /// document; all other failures propagate to the caller.
    pub async fn handle_fetch(&self, request: Request) -> GatewayResult<FetchOutcome> {
        let store = self.store().await?;
        let key = request.key();

        if let Some(hit) = store.lookup(&key).await? {
            debug!(key = %key, "Cache hit");
            return Ok(FetchOutcome {
                response: hit,
                served_from: ServedFrom::Cache,
            });
        }

        match self.network.fetch(&request).await {
            Ok(response) => {
                if response.is_success() && request.method == Method::Get {
                    // Clone before the response body is handed to the
                    // caller; the store consumes its copy.
                    let copy = response.clone();
                    let store = Arc::clone(&store);
                    tokio::spawn(async move {
                        if let Err(e) = store.put(key.clone(), copy).await {
                            warn!(key = %key, error = %e, "Background cache write failed");
                        }
                    });
                } else {
                    debug!(key = %key, status = response.status, "Response not storable");
                }

                Ok(FetchOutcome {
                    response,
                    served_from: ServedFrom::Network,
                })
            }
            Err(err) if request.mode == RequestMode::Navigate => {
                match store.lookup(&self.fallback).await? {
                    Some(doc) => {
                        info!(url = %request.url, "Serving offline fallback document");
                        Ok(FetchOutcome {
                            response: doc,
                            served_from: ServedFrom::Fallback,
                        })
                    }
                    // Fallback never cached: the navigation just fails
                    None => Err(err),
                }
            }
            Err(err) => Err(err),
        }
    }

    /// Handle a control message from a consumer.
    ///
    /// Only the force-activation message is recognized; anything else,
    /// including messages that do not match the expected shape, is
    /// silently ignored and never answered.
    pub async fn handle_message(&self, message: serde_json::Value) -> GatewayResult<()> {
        let Ok(msg) = serde_json::from_value::<ControlMessage>(message) else {
            return Ok(());
        };

        if msg.kind == FORCE_ACTIVATION {
            info!("Force-activation message received");
            self.host.skip_waiting().await
        } else {
            debug!(kind = %msg.kind, "Ignoring unrecognized message");
            Ok(())
        }
    }
}
