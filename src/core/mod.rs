//! Runtime core: the one-shot controller and the host that drives it.
//!
//! Internal modules:
//! - [`service`]: the run-once state machine ([`OneShotService`]);
//! - [`state`]: execution state and its atomic cell;
//! - [`completion`]: the completion flag read at stop time;
//! - [`shutdown`]: shutdown signal contract and OS signal handling;
//! - [`hosted`]: start/stop contract driven by the host;
//! - [`host`]: registration shim and run loop;
//! - [`config`]: runtime settings.

mod completion;
mod config;
mod host;
mod hosted;
mod service;
mod shutdown;
mod state;

pub use config::Config;
pub use host::{Host, HostBuilder};
pub use hosted::HostedService;
pub use service::OneShotService;
pub use shutdown::{ShutdownHandle, ShutdownSignal, wait_for_shutdown_signal};
pub use state::ExecutionState;
