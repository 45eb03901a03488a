//! # Global runtime configuration.
//!
//! Provides [`Config`] centralized settings for one-shot services and the host.
//!
//! Config is used in two ways:
//! 1. **Host creation**: `Host::builder(config)`
//! 2. **Service defaults**: `OneShotService::new(&config, ...)` reads `shutdown_delay`
//!
//! ## Sentinel values
//! - `grace = 0s` → stop does not wait for the execution task at all
//! - `bus_capacity = 0` → clamped to 1

use std::time::Duration;

/// Global configuration for one-shot services and their host.
///
/// ## Field semantics
/// - `shutdown_delay`: grace wait between the work settling and the shutdown request
/// - `grace`: maximum time the host's stop sequence waits for services
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
/// - `handle_os_signals`: whether the host also stops on SIGINT/SIGTERM/Ctrl-C
#[derive(Clone, Debug)]
pub struct Config {
    /// Wait before a settled service asks the host to shut down.
    ///
    /// Absorbs the race where the work finishes before the host completed its
    /// own startup. The wait is never cut short by cancellation.
    pub shutdown_delay: Duration,

    /// Maximum time to wait for services to stop.
    ///
    /// When it elapses the stop token passed to every service is cancelled; the
    /// completion check still runs and decides the result.
    pub grace: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    pub bus_capacity: usize,

    /// Stop the host on OS termination signals in addition to service requests.
    pub handle_os_signals: bool,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns the stop grace as an `Option`.
    ///
    /// - `None` → do not wait
    /// - `Some(d)` → wait up to `d`
    #[inline]
    pub fn stop_grace(&self) -> Option<Duration> {
        if self.grace == Duration::ZERO {
            None
        } else {
            Some(self.grace)
        }
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `shutdown_delay = 1s`
    /// - `grace = 30s`
    /// - `bus_capacity = 1024`
    /// - `handle_os_signals = true`
    fn default() -> Self {
        Self {
            shutdown_delay: Duration::from_secs(1),
            grace: Duration::from_secs(30),
            bus_capacity: 1024,
            handle_os_signals: true,
        }
    }
}
