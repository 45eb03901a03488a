//! # LogWriter: renders events through `tracing`
//!
//! A subscriber that turns incoming [`Event`]s into structured `tracing` records.
//! Install any `tracing` subscriber (e.g. `tracing_subscriber::fmt`) to see them.
//!
//! ## Levels
//! ```text
//! info   starting / executing / finished / stopping / shutdown-requested / host lifecycle
//! debug  scope-released / shutdown-scheduled
//! warn   not-finished / subscriber-overflow
//! error  failed / subscriber-panicked
//! ```

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let service = e.service.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");

        match e.kind {
            EventKind::ServiceStarting => {
                info!(seq = e.seq, service, "one-shot service is starting");
            }
            EventKind::ServiceExecuting => {
                info!(seq = e.seq, service, "one-shot service is executed");
            }
            EventKind::ServiceFinished => {
                info!(seq = e.seq, service, "one-shot service is finished");
            }
            EventKind::ServiceFailed => {
                error!(
                    seq = e.seq,
                    service,
                    error = reason,
                    "one-shot service failed with an error"
                );
            }
            EventKind::ScopeReleased => {
                debug!(seq = e.seq, service, "execution scope released");
            }
            EventKind::ServiceStopping => {
                info!(seq = e.seq, service, "one-shot service is stopping");
            }
            EventKind::ServiceNotFinished => {
                warn!(seq = e.seq, service, "one-shot service was not finished");
            }
            EventKind::ShutdownScheduled => {
                debug!(seq = e.seq, service, delay_ms = e.delay_ms, "shutdown scheduled");
            }
            EventKind::ShutdownRequested => {
                info!(seq = e.seq, service, "shutdown requested");
            }
            EventKind::HostStarted => {
                info!(seq = e.seq, "host started");
            }
            EventKind::HostStopping => {
                info!(seq = e.seq, timeout_ms = e.delay_ms, "host is stopping");
            }
            EventKind::HostStopped => match &e.reason {
                Some(err) => error!(seq = e.seq, error = &**err, "host stopped with an error"),
                None => info!(seq = e.seq, "host stopped"),
            },
            EventKind::SubscriberOverflow => {
                warn!(seq = e.seq, subscriber = service, reason, "subscriber overflow");
            }
            EventKind::SubscriberPanicked => {
                error!(seq = e.seq, subscriber = service, info = reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
