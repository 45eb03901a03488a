//! # Example: failing_one_shot
//!
//! The unit of work fails. The error is logged, the host still shuts down after
//! the grace delay, and `run` returns `NotFinished`, which becomes exit code 1.
//!
//! ## Run
//! ```bash
//! cargo run --example failing_one_shot; echo "exit=$?"
//! ```

use std::process::ExitCode;
use std::sync::Arc;

use singleshot::{Config, Host, LogWriter, ResolveError, RunFn, ScopeFn, Subscribe, TaskError};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

struct Importer {
    source: &'static str,
}

impl Importer {
    async fn import(&self) -> Result<usize, std::io::Error> {
        Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} not found", self.source),
        ))
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let mut host = Host::builder(Config::default())
        .with_subscribers(subs)
        .build();

    let registered = host.add_one_shot::<Importer>(
        ScopeFn::arc(|| Ok::<_, ResolveError>(Importer { source: "orders.csv" })),
        RunFn::arc(|importer: Importer, _ctx: CancellationToken| async move {
            let rows = importer.import().await.map_err(TaskError::fail)?;
            tracing::info!(rows, "import done");
            Ok::<_, TaskError>(())
        }),
    );
    if let Err(e) = registered {
        eprintln!("{e}");
        return ExitCode::from(e.exit_code() as u8);
    }

    match host.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.as_message());
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
