//! # Unit-of-work trait.
//!
//! The controller resolves a `T` from a fresh scope and hands it to
//! [`RunScoped::run_scoped`] together with its stopping token.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// Shared handle to a unit of work over `T`.
pub type RunRef<T> = Arc<dyn RunScoped<T>>;

/// # Asynchronous, cancelable action over a scoped dependency.
///
/// Implementors receive the service resolved for this execution and a
/// [`CancellationToken`]. The controller never aborts the future; honoring
/// cancellation is up to the implementation.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use tokio_util::sync::CancellationToken;
/// use singleshot::{RunScoped, TaskError};
///
/// struct Mailer;
/// impl Mailer {
///     async fn flush(&self) -> Result<(), std::io::Error> { Ok(()) }
/// }
///
/// struct FlushOutbox;
///
/// #[async_trait]
/// impl RunScoped<Mailer> for FlushOutbox {
///     async fn run_scoped(&self, mailer: Mailer, ctx: CancellationToken) -> Result<(), TaskError> {
///         if ctx.is_cancelled() {
///             return Err(TaskError::Canceled);
///         }
///         mailer.flush().await.map_err(TaskError::fail)
///     }
/// }
/// ```
#[async_trait]
pub trait RunScoped<T>: Send + Sync + 'static {
    /// Runs the unit of work once with the resolved `service`.
    async fn run_scoped(&self, service: T, ctx: CancellationToken) -> Result<(), TaskError>;
}
