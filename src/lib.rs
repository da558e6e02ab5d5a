//! Cachegate - Versioned Cache Gateway
//!
//! Serves intercepted requests cache-first from a version-tagged cache
//! generation, pre-warmed from a manifest, with network fallback and a
//! cached offline document for failed navigations.

pub mod config;
pub mod error;
pub mod gateway;
pub mod generation;
pub mod http;
pub mod network;
pub mod runtime;
pub mod storage;

pub use error::{GatewayError, GatewayResult};
pub use gateway::{FetchOutcome, Gateway, ServedFrom, FORCE_ACTIVATION};
pub use generation::GenerationId;
pub use http::{Method, Request, RequestKey, RequestMode, Response};
