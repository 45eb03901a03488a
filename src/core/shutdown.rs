//! # Shutdown coupling between services and their host.
//!
//! - [`ShutdownSignal`] is what a one-shot service calls once its work settled.
//! - [`ShutdownHandle`] is the token-backed implementation the host waits on.
//! - [`wait_for_shutdown_signal`] completes on an OS termination signal.
//!
//! ## Signals
//! **Unix platforms:** `SIGINT`, `SIGTERM`, `SIGQUIT`
//!
//! **Windows platforms:** `Ctrl-C` via [`tokio::signal::ctrl_c`]

use tokio_util::sync::CancellationToken;

/// Requests host-wide termination.
///
/// Fire-and-forget and idempotent: the host decides how and when it tears down.
pub trait ShutdownSignal: Send + Sync + 'static {
    /// Asks the host to shut down.
    fn request_shutdown(&self);
}

/// Cloneable shutdown request backed by a [`CancellationToken`].
///
/// # Example
/// ```
/// use singleshot::{ShutdownHandle, ShutdownSignal};
///
/// let handle = ShutdownHandle::new();
/// assert!(!handle.is_requested());
/// handle.request_shutdown();
/// handle.request_shutdown(); // idempotent
/// assert!(handle.is_requested());
/// ```
#[derive(Clone, Debug, Default)]
pub struct ShutdownHandle {
    token: CancellationToken,
}

impl ShutdownHandle {
    /// Creates a handle with no pending request.
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` once shutdown has been requested.
    pub fn is_requested(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes once shutdown has been requested.
    pub async fn requested(&self) {
        self.token.cancelled().await;
    }
}

impl ShutdownSignal for ShutdownHandle {
    fn request_shutdown(&self) {
        self.token.cancel();
    }
}

/// Waits for a termination signal.
///
/// Each call creates independent signal listeners.
///
/// Returns `Ok(())` when any signal is received, or `Err` if signal registration fails.
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = sigint.recv()  => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

/// Waits for a termination signal.
///
/// Returns `Ok(())` when Ctrl-C is received, or `Err` if signal registration fails.
#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn clones_share_the_request() {
        let handle = ShutdownHandle::new();
        let waiter = handle.clone();
        let join = tokio::spawn(async move { waiter.requested().await });

        handle.request_shutdown();
        tokio::time::timeout(Duration::from_secs(1), join)
            .await
            .expect("waiter should observe the request")
            .unwrap();
    }
}
