//! # Runtime events emitted by one-shot services and the host.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Service events**: the one-shot lifecycle (starting, executing, finished, failed, stopping)
//! - **Shutdown events**: the delayed shutdown request and host teardown
//! - **Subscriber events**: overflow and panic reports from subscriber workers
//!
//! The [`Event`] struct carries additional metadata such as timestamps, service name,
//! reasons, and the scheduled shutdown delay.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use singleshot::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::ServiceFailed)
//!     .with_service("nightly-import")
//!     .with_reason("boom")
//!     .with_delay(Duration::from_secs(1));
//!
//! assert_eq!(ev.kind, EventKind::ServiceFailed);
//! assert_eq!(ev.service.as_deref(), Some("nightly-import"));
//! assert_eq!(ev.reason.as_deref(), Some("boom"));
//! assert_eq!(ev.delay_ms, Some(1000));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `service`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `service`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    // === Service lifecycle events ===
    /// Service `start` was called; execution is being handed off.
    ///
    /// Sets:
    /// - `service`: service name
    ServiceStarting,

    /// The unit of work is about to be resolved and run.
    ///
    /// Sets:
    /// - `service`: service name
    ServiceExecuting,

    /// The unit of work returned normally; the completion flag is set.
    ///
    /// Sets:
    /// - `service`: service name
    ServiceFinished,

    /// Resolution or execution failed; the error was absorbed.
    ///
    /// Sets:
    /// - `service`: service name
    /// - `reason`: error message
    ServiceFailed,

    /// The execution scope was released.
    ///
    /// Sets:
    /// - `service`: service name
    ScopeReleased,

    /// Service `stop` was called.
    ///
    /// Sets:
    /// - `service`: service name
    ServiceStopping,

    /// Service stopped but its unit of work never completed.
    ///
    /// Sets:
    /// - `service`: service name
    ServiceNotFinished,

    // === Shutdown events ===
    /// The service settled and will request shutdown after the grace delay.
    ///
    /// Sets:
    /// - `service`: service name
    /// - `delay_ms`: grace delay before the request (ms)
    ShutdownScheduled,

    /// The service asked the host to shut down.
    ///
    /// Sets:
    /// - `service`: service name
    ShutdownRequested,

    /// All registered services were started by the host.
    HostStarted,

    /// The host observed a shutdown request and is stopping services.
    ///
    /// Sets:
    /// - `delay_ms`: stop timeout (ms)
    HostStopping,

    /// Every service was stopped.
    ///
    /// Sets:
    /// - `reason`: first stop error, if any
    HostStopped,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Name of the service (or subscriber), if applicable.
    pub service: Option<Arc<str>>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Delay or timeout attached to the event in milliseconds (compact).
    pub delay_ms: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            service: None,
            reason: None,
            delay_ms: None,
        }
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a service name.
    #[inline]
    pub fn with_service(mut self, service: impl Into<Arc<str>>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Attaches a delay (stored as milliseconds, saturating at `u32::MAX`).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_service(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_service(subscriber)
            .with_reason(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_numbers_increase() {
        let a = Event::new(EventKind::ServiceStarting);
        let b = Event::new(EventKind::ServiceExecuting);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn delay_saturates_at_u32_max() {
        let ev = Event::new(EventKind::ShutdownScheduled).with_delay(Duration::from_secs(u64::MAX));
        assert_eq!(ev.delay_ms, Some(u32::MAX));
    }
}
