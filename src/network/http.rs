//! HTTP network backend
//!
//! Resolves manifest-relative paths against a configured origin and maps
//! transport failures to `GatewayError::Unreachable` so the gateway can
//! tell "server said no" apart from "no server".

use crate::error::{GatewayError, GatewayResult};
use crate::http::{Method, Request, Response};
use crate::network::NetworkClient;
use async_trait::async_trait;
use reqwest::Url;

/// reqwest-backed network client
pub struct HttpNetworkClient {
    origin: Url,
    client: reqwest::Client,
}

impl HttpNetworkClient {
    /// Create a client resolving relative request URLs against an origin
    pub fn new(origin: &str) -> GatewayResult<Self> {
        let origin = Url::parse(origin).map_err(|e| GatewayError::UrlInvalid {
            url: origin.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            origin,
            client: reqwest::Client::new(),
        })
    }

    fn resolve(&self, url: &str) -> GatewayResult<Url> {
        self.origin.join(url).map_err(|e| GatewayError::UrlInvalid {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Head => reqwest::Method::HEAD,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
        Method::Options => reqwest::Method::OPTIONS,
        Method::Patch => reqwest::Method::PATCH,
    }
}

#[async_trait]
impl NetworkClient for HttpNetworkClient {
    async fn fetch(&self, request: &Request) -> GatewayResult<Response> {
        let url = self.resolve(&request.url)?;

        let reply = self
            .client
            .request(to_reqwest_method(request.method), url.clone())
            .send()
            .await
            .map_err(|e| GatewayError::Unreachable {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = reply.status().as_u16();
        let content_type = reply
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        // Body read failure mid-stream counts as a connectivity failure
        let body = reply.bytes().await.map_err(|e| GatewayError::Unreachable {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Response {
            status,
            content_type,
            body,
        })
    }
}
