//! # Example: basic_one_shot
//!
//! A unit of work that runs once, after which the host shuts itself down.
//!
//! ## Flow
//! ```text
//! Host::run()
//!     ├─► OneShotService::start()    (spawns execution, returns)
//!     │     ├─► scope.resolve() ─► Greeter
//!     │     ├─► run_scoped(greeter) ─► Ok
//!     │     └─► sleep(1s) ─► request_shutdown()
//!     └─► OneShotService::stop() ─► Ok (work completed)
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=info cargo run --example basic_one_shot
//! ```

use std::sync::Arc;
use std::time::Duration;

use singleshot::{Config, Host, LogWriter, ResolveError, RunFn, ScopeFn, Subscribe, TaskError};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

struct Greeter {
    name: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let mut host = Host::builder(Config::default())
        .with_subscribers(subs)
        .build();

    host.add_one_shot::<Greeter>(
        ScopeFn::arc(|| {
            Ok::<_, ResolveError>(Greeter {
                name: "world".to_string(),
            })
        }),
        RunFn::arc(|greeter: Greeter, ctx: CancellationToken| async move {
            for i in 1..=3 {
                if ctx.is_cancelled() {
                    return Err(TaskError::Canceled);
                }
                tracing::info!(tick = i, "hello, {}", greeter.name);
                tokio::time::sleep(Duration::from_millis(200)).await;
            }
            Ok(())
        }),
    )?;

    host.run().await?;
    Ok(())
}
