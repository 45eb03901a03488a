//! # Function-backed unit of work (`RunFn`)
//!
//! [`RunFn`] wraps a closure `F: Fn(T, CancellationToken) -> Fut`.
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use singleshot::{RunFn, RunRef, TaskError};
//!
//! let work: RunRef<String> = RunFn::arc(|greeting: String, _ctx: CancellationToken| async move {
//!     println!("{greeting}");
//!     Ok::<_, TaskError>(())
//! });
//! # let _ = work;
//! ```

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::work::run::RunScoped;

/// Function-backed unit of work.
#[derive(Debug)]
pub struct RunFn<F> {
    f: F,
}

impl<F> RunFn<F> {
    /// Creates a new function-backed unit of work.
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the unit of work and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<T, F, Fut> RunScoped<T> for RunFn<F>
where
    T: Send + 'static,
    F: Fn(T, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    async fn run_scoped(&self, service: T, ctx: CancellationToken) -> Result<(), TaskError> {
        (self.f)(service, ctx).await
    }
}
