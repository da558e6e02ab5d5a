//! Host runtime control abstraction
//!
//! The gateway signals its hosting runtime at two points: when a freshly
//! installed generation should become eligible without waiting for the
//! previous one to wind down (`skip_waiting`), and when an activated
//! generation should take over all open consumers immediately
//! (`claim_clients`).

use crate::error::GatewayResult;
use async_trait::async_trait;
use tracing::debug;

/// Abstract host runtime control interface
#[async_trait]
pub trait HostRuntime: Send + Sync {
    /// Mark this generation eligible for activation without waiting
    async fn skip_waiting(&self) -> GatewayResult<()>;

    /// Take control of all currently open consumers immediately
    async fn claim_clients(&self) -> GatewayResult<()>;
}

/// No-op runtime for hosts without a control surface
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRuntime;

#[async_trait]
impl HostRuntime for NullRuntime {
    async fn skip_waiting(&self) -> GatewayResult<()> {
        debug!("skip_waiting signalled (no-op runtime)");
        Ok(())
    }

    async fn claim_clients(&self) -> GatewayResult<()> {
        debug!("claim_clients signalled (no-op runtime)");
        Ok(())
    }
}
