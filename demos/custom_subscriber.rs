//! # Example: custom_subscriber
//!
//! Shows how to observe the one-shot lifecycle with your own [`Subscribe`]
//! implementation, alongside a custom [`Scope`] that releases a resource on drop.
//!
//! ## Run
//! ```bash
//! cargo run --example custom_subscriber
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use singleshot::{
    Config, Event, EventKind, Host, ResolveError, RunFn, Scope, ScopeFactory, Subscribe,
    TaskError,
};
use tokio_util::sync::CancellationToken;

/// Prints a compact timeline of lifecycle events.
struct Timeline;

#[async_trait]
impl Subscribe for Timeline {
    async fn on_event(&self, ev: &Event) {
        let label = match ev.kind {
            EventKind::ServiceStarting => "starting",
            EventKind::ServiceExecuting => "executing",
            EventKind::ServiceFinished => "finished",
            EventKind::ServiceFailed => "failed",
            EventKind::ScopeReleased => "scope-released",
            EventKind::ShutdownScheduled => "shutdown-scheduled",
            EventKind::ShutdownRequested => "shutdown-requested",
            EventKind::ServiceStopping => "stopping",
            EventKind::ServiceNotFinished => "not-finished",
            EventKind::HostStarted => "host-started",
            EventKind::HostStopping => "host-stopping",
            EventKind::HostStopped => "host-stopped",
            EventKind::SubscriberOverflow | EventKind::SubscriberPanicked => "subscriber-issue",
        };
        println!(
            "[{:>3}] {label:<20} service={} reason={}",
            ev.seq,
            ev.service.as_deref().unwrap_or("-"),
            ev.reason.as_deref().unwrap_or("-"),
        );
    }

    fn name(&self) -> &'static str {
        "timeline"
    }
}

/// Stand-in for a pooled connection.
struct Connection {
    id: u32,
}

/// Hands out connections, one per scope.
struct Pool {
    next: AtomicU32,
}

struct PoolScope<'a> {
    pool: &'a Pool,
    id: u32,
}

impl Scope<Connection> for PoolScope<'_> {
    fn resolve(&mut self) -> Result<Connection, ResolveError> {
        Ok(Connection { id: self.id })
    }
}

impl Drop for PoolScope<'_> {
    fn drop(&mut self) {
        println!(
            "connection {} returned to pool ({} handed out)",
            self.id,
            self.pool.next.load(Ordering::Relaxed)
        );
    }
}

impl ScopeFactory<Connection> for Pool {
    fn create_scope(&self) -> Box<dyn Scope<Connection> + '_> {
        let id = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        Box::new(PoolScope { pool: self, id })
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config {
        shutdown_delay: Duration::from_millis(250),
        ..Config::default()
    };
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(Timeline)];
    let mut host = Host::builder(cfg).with_subscribers(subs).build();

    host.add_one_shot::<Connection>(
        Arc::new(Pool {
            next: AtomicU32::new(0),
        }),
        RunFn::arc(|conn: Connection, _ctx: CancellationToken| async move {
            println!("vacuuming through connection {}", conn.id);
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok::<_, TaskError>(())
        }),
    )?;

    host.run().await?;
    Ok(())
}
