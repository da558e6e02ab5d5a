//! Network abstraction
//!
//! The gateway never talks to the network directly; it goes through
//! `NetworkClient` so tests can substitute a scripted fake and hosts can
//! substitute their own transport.

pub mod http;

pub use http::HttpNetworkClient;

use crate::error::GatewayResult;
use crate::http::{Request, Response};
use async_trait::async_trait;

/// Abstract network fetch interface
///
/// A server answering with an error status is `Ok` (the status travels in
/// the response); `Err` is reserved for connectivity failures where no
/// response was obtained at all. The gateway's fallback policy relies on
/// this distinction.
#[async_trait]
pub trait NetworkClient: Send + Sync {
    async fn fetch(&self, request: &Request) -> GatewayResult<Response>;
}
