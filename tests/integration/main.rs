//! Integration tests for Cachegate
//!
//! Drives full gateway lifecycles (install, activate, fetch, message)
//! through the public API with a scripted network and a recording host
//! runtime against the real in-memory storage backend.

use async_trait::async_trait;
use cachegate::config::Config;
use cachegate::error::{GatewayError, GatewayResult};
use cachegate::gateway::Gateway;
use cachegate::network::NetworkClient;
use cachegate::runtime::HostRuntime;
use cachegate::storage::{CacheStorage, CacheStore, MemoryStorage};
use cachegate::{Request, RequestKey, Response, ServedFrom};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Scripted network shared by every gateway under test
#[derive(Default)]
struct ScriptedNetwork {
    routes: Mutex<HashMap<String, Response>>,
    offline: AtomicBool,
}

impl ScriptedNetwork {
    fn serve(&self, url: &str, response: Response) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), response);
    }

    fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }
}

#[async_trait]
impl NetworkClient for ScriptedNetwork {
    async fn fetch(&self, request: &Request) -> GatewayResult<Response> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(GatewayError::Unreachable {
                url: request.url.clone(),
                reason: "network down".to_string(),
            });
        }
        let routes = self.routes.lock().unwrap();
        Ok(routes
            .get(&request.url)
            .cloned()
            .unwrap_or_else(|| Response::with_status(404, "not found")))
    }
}

#[derive(Default)]
struct RecordingRuntime {
    signals: Mutex<Vec<&'static str>>,
}

impl RecordingRuntime {
    fn signals(&self) -> Vec<&'static str> {
        self.signals.lock().unwrap().clone()
    }
}

#[async_trait]
impl HostRuntime for RecordingRuntime {
    async fn skip_waiting(&self) -> GatewayResult<()> {
        self.signals.lock().unwrap().push("skip_waiting");
        Ok(())
    }

    async fn claim_clients(&self) -> GatewayResult<()> {
        self.signals.lock().unwrap().push("claim_clients");
        Ok(())
    }
}

struct World {
    storage: Arc<MemoryStorage>,
    network: Arc<ScriptedNetwork>,
    host: Arc<RecordingRuntime>,
}

impl World {
    fn new() -> Self {
        let world = Self {
            storage: Arc::new(MemoryStorage::new()),
            network: Arc::new(ScriptedNetwork::default()),
            host: Arc::new(RecordingRuntime::default()),
        };
        world
            .network
            .serve("./", Response::ok("<html>root</html>").content_type("text/html"));
        world.network.serve(
            "./index.html",
            Response::ok("<html>app shell</html>").content_type("text/html"),
        );
        world
    }

    fn gateway(&self, version: &str) -> Gateway {
        let mut config = Config::default();
        config.generation.app = "demo".to_string();
        config.generation.version = version.to_string();
        Gateway::new(
            &config,
            Arc::clone(&self.storage) as Arc<dyn CacheStorage>,
            Arc::clone(&self.network) as Arc<dyn NetworkClient>,
            Arc::clone(&self.host) as Arc<dyn HostRuntime>,
        )
        .unwrap()
    }

    async fn store(&self, generation: &str) -> Arc<dyn CacheStore> {
        self.storage.open(generation).await.unwrap()
    }
}

async fn wait_for_entry(store: &Arc<dyn CacheStore>, key: &RequestKey) -> bool {
    for _ in 0..100 {
        if store.contains(key).await.unwrap() {
            return true;
        }
        tokio::task::yield_now().await;
    }
    false
}

mod lifecycle {
    use super::*;

    #[tokio::test]
    async fn install_then_activate_serves_from_cache() {
        let world = World::new();
        let gateway = world.gateway("1.0.0");

        gateway.install().await.unwrap();
        gateway.activate().await.unwrap();
        assert_eq!(world.host.signals(), vec!["skip_waiting", "claim_clients"]);

        // Cache-first: even with new network content, the stored copy wins
        world
            .network
            .serve("./index.html", Response::ok("<html>newer</html>"));
        let outcome = gateway
            .handle_fetch(Request::get("./index.html"))
            .await
            .unwrap();
        assert_eq!(outcome.served_from, ServedFrom::Cache);
        assert_eq!(outcome.response.body.as_ref(), b"<html>app shell</html>");
    }

    #[tokio::test]
    async fn upgrade_replaces_old_generation() {
        let world = World::new();

        let v1 = world.gateway("1.0.0");
        v1.install().await.unwrap();
        v1.activate().await.unwrap();

        // A waiting v2 is told to take over via the control channel
        let v2 = world.gateway("1.1.0");
        v2.install().await.unwrap();
        v2.handle_message(serde_json::json!({ "type": "SKIP_WAITING" }))
            .await
            .unwrap();
        v2.activate().await.unwrap();

        assert_eq!(
            world.storage.generations().await.unwrap(),
            vec!["demo-v1.1.0".to_string()]
        );

        // v2 serves from its own pre-warmed generation
        let outcome = v2.handle_fetch(Request::get("./")).await.unwrap();
        assert_eq!(outcome.served_from, ServedFrom::Cache);
    }

    #[tokio::test]
    async fn failed_install_leaves_no_takeover_signal() {
        let world = World::new();
        world.network.set_offline(true);

        let gateway = world.gateway("1.0.0");
        let err = gateway.install().await.unwrap_err();
        assert!(matches!(err, GatewayError::PrewarmFetch { .. }));
        assert!(world.host.signals().is_empty());
    }
}

mod offline {
    use super::*;

    #[tokio::test]
    async fn app_keeps_working_after_network_loss() {
        let world = World::new();
        world
            .network
            .serve("./app.js", Response::ok("console.log('hi')"));

        let gateway = world.gateway("1.0.0");
        gateway.install().await.unwrap();
        gateway.activate().await.unwrap();

        // Visit a sub-resource once while online so it gets cached
        let online = gateway.handle_fetch(Request::get("./app.js")).await.unwrap();
        assert_eq!(online.served_from, ServedFrom::Network);
        let store = world.store("demo-v1.0.0").await;
        assert!(wait_for_entry(&store, &RequestKey::get("./app.js")).await);

        world.network.set_offline(true);

        // Pre-warmed and previously fetched resources still serve
        for url in ["./", "./index.html", "./app.js"] {
            let outcome = gateway.handle_fetch(Request::get(url)).await.unwrap();
            assert_eq!(outcome.served_from, ServedFrom::Cache, "url: {url}");
        }

        // Unknown navigation falls back to the cached app shell
        let nav = gateway
            .handle_fetch(Request::navigate("./profile"))
            .await
            .unwrap();
        assert_eq!(nav.served_from, ServedFrom::Fallback);
        assert_eq!(nav.response.body.as_ref(), b"<html>app shell</html>");

        // Unknown sub-resource fails; no fallback for those
        let err = gateway
            .handle_fetch(Request::get("./analytics.js"))
            .await
            .unwrap_err();
        assert!(err.is_offline());
    }

    #[tokio::test]
    async fn error_statuses_pass_through_uncached() {
        let world = World::new();
        world
            .network
            .serve("./flaky.json", Response::with_status(503, "try later"));

        let gateway = world.gateway("1.0.0");
        gateway.install().await.unwrap();

        let outcome = gateway
            .handle_fetch(Request::get("./flaky.json"))
            .await
            .unwrap();
        assert_eq!(outcome.response.status, 503);

        tokio::task::yield_now().await;
        let store = world.store("demo-v1.0.0").await;
        assert!(!store
            .contains(&RequestKey::get("./flaky.json"))
            .await
            .unwrap());

        // Once the server recovers, the fresh 200 is cached
        world.network.serve("./flaky.json", Response::ok("{}"));
        let recovered = gateway
            .handle_fetch(Request::get("./flaky.json"))
            .await
            .unwrap();
        assert_eq!(recovered.response.status, 200);
        assert!(wait_for_entry(&store, &RequestKey::get("./flaky.json")).await);
    }
}

mod config_loading {
    use super::*;
    use cachegate::config::ConfigManager;
    use cachegate::runtime::NullRuntime;
    use tempfile::TempDir;

    #[tokio::test]
    async fn gateway_builds_from_config_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        tokio::fs::write(
            &path,
            r#"
            [generation]
            app = "demo"
            version = "1.1.0"

            [cache]
            manifest = ["./", "./index.html", "./manifest.json"]
            fallback_document = "./index.html"

            [network]
            origin = "https://demo.example/"
            "#,
        )
        .await
        .unwrap();

        let config = ConfigManager::with_path(path).load().await.unwrap();
        assert_eq!(config.network.origin, "https://demo.example/");

        let world = World::new();
        world.network.serve("./manifest.json", Response::ok("{}"));

        let gateway = Gateway::new(
            &config,
            Arc::clone(&world.storage) as Arc<dyn CacheStorage>,
            Arc::clone(&world.network) as Arc<dyn NetworkClient>,
            Arc::new(NullRuntime),
        )
        .unwrap();
        assert_eq!(gateway.generation().to_string(), "demo-v1.1.0");

        gateway.install().await.unwrap();
        let store = world.store("demo-v1.1.0").await;
        assert!(store
            .contains(&RequestKey::get("./manifest.json"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn config_with_uncached_fallback_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        tokio::fs::write(
            &path,
            r#"
            [cache]
            manifest = ["./"]
            fallback_document = "./offline.html"
            "#,
        )
        .await
        .unwrap();

        let err = ConfigManager::with_path(path).load().await.unwrap_err();
        assert!(matches!(err, GatewayError::ConfigInvalid { .. }));
    }
}
