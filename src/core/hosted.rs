//! # Hosted service contract.
//!
//! What the [`Host`](crate::Host) drives: `start` once at host startup, `stop`
//! once at host shutdown. `start` must not block on long-running work.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::RuntimeError;

/// A service with a host-managed lifecycle.
#[async_trait]
pub trait HostedService: Send + Sync + 'static {
    /// Stable name used for registration and events.
    fn name(&self) -> &str;

    /// Starts the service. Returns promptly; long work runs in the background.
    async fn start(&self, ctx: CancellationToken) -> Result<(), RuntimeError>;

    /// Stops the service. `ctx` is cancelled when the host stops waiting.
    async fn stop(&self, ctx: CancellationToken) -> Result<(), RuntimeError>;
}
