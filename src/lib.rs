//! # singleshot
//!
//! **singleshot** runs a background unit of work exactly once inside a long-lived
//! tokio process, then asks the process to shut down, and reports at stop time
//! whether the work actually completed.
//!
//! ## Architecture
//! ```text
//!   ScopeFactory<T>          RunScoped<T>            ShutdownSignal
//!   (resolves T per run)     (the unit of work)      (asks host to stop)
//!          │                        │                       ▲
//!          └──────────┬─────────────┘                       │
//!                     ▼                                     │
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  OneShotService<T>                                                │
//! │  - start(): spawn execution, return immediately                   │
//! │  - execute: scope → resolve → run → Completed | Failed            │
//! │             → sleep(shutdown_delay) → request_shutdown() ─────────┘
//! │  - stop():  cancel, join, check completion flag                   │
//! └──────┬────────────────────────────────────────────────────────────┘
//!        │ publish(Event)
//!        ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Bus (broadcast channel) ──► Host listener ──► SubscriberSet      │
//! │                                                 ├─► LogWriter     │
//! │                                                 └─► custom ...    │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ### Lifecycle
//! ```text
//! Host::run()
//!   ├─► OneShotService::start()          NotStarted
//!   │     └─► spawn execute()            Running
//!   │            ├─ Ok  ──► finished     Completed
//!   │            └─ Err ──► logged       Failed
//!   │            └─► sleep(delay) ─► ShutdownHandle::request_shutdown()
//!   ├─► wait for shutdown request (or OS signal)
//!   └─► OneShotService::stop()
//!          ├─ Completed         ─► Ok(())
//!          └─ anything else     ─► Err(RuntimeError::NotFinished)
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                          |
//! |-------------------|--------------------------------------------------------------|---------------------------------------------|
//! | **Controller**    | Run-once state machine coupled to host shutdown.             | [`OneShotService`], [`ExecutionState`]      |
//! | **Work**          | The action to run, over a scoped dependency.                 | [`RunScoped`], [`RunFn`]                    |
//! | **Scopes**        | Per-execution resolution, released on every exit path.       | [`ScopeFactory`], [`Scope`], [`ScopeFn`]    |
//! | **Hosting**       | Registration, start/stop driving, exit-code friendly errors. | [`Host`], [`HostedService`]                 |
//! | **Subscriber API**| Hook into lifecycle events (logging, metrics, audits).       | [`Subscribe`], [`LogWriter`]                |
//! | **Errors**        | Typed errors for resolution, execution and stop.             | [`ResolveError`], [`TaskError`], [`RuntimeError`] |
//! | **Configuration** | Centralized runtime settings.                                | [`Config`]                                  |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use singleshot::{Config, Host, LogWriter, ResolveError, RunFn, ScopeFn, Subscribe, TaskError};
//!
//! struct Cleanup;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config { handle_os_signals: false, ..Config::default() };
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
//!
//!     let mut host = Host::builder(cfg).with_subscribers(subs).build();
//!     host.add_one_shot::<Cleanup>(
//!         ScopeFn::arc(|| Ok::<_, ResolveError>(Cleanup)),
//!         RunFn::arc(|_c: Cleanup, ctx: CancellationToken| async move {
//!             if ctx.is_cancelled() {
//!                 return Err(TaskError::Canceled);
//!             }
//!             // do the work once...
//!             Ok(())
//!         }),
//!     )?;
//!
//!     host.run().await?;
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod scope;
mod subscribers;
mod work;

// ---- Public re-exports ----

pub use self::core::{
    Config, ExecutionState, Host, HostBuilder, HostedService, OneShotService, ShutdownHandle,
    ShutdownSignal, wait_for_shutdown_signal,
};
pub use error::{ResolveError, RuntimeError, TaskError};
pub use events::{Bus, Event, EventKind};
pub use scope::{Scope, ScopeFactory, ScopeFn, ScopeRef};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
pub use work::{RunFn, RunRef, RunScoped};
