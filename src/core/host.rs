//! # Host: registration and start/stop driving for hosted services.
//!
//! The [`Host`] is the thin shim a process needs around [`OneShotService`]s:
//! it owns the event bus and the shutdown handle, registers one service per
//! name, starts them, waits until one of them (or the OS) requests shutdown,
//! stops them in reverse order, and returns the first stop error.
//!
//! ## Run sequence
//! ```text
//! run()
//!   ├─► spawn listener: Bus ─► SubscriberSet
//!   ├─► start services in registration order     (first error aborts startup)
//!   ├─► publish HostStarted
//!   ├─► wait: ShutdownHandle::requested() | OS signal (if enabled)
//!   ├─► publish HostStopping
//!   ├─► stop services in reverse order, stop token cancelled after cfg.grace
//!   ├─► publish HostStopped
//!   └─► drain listener, shut subscribers down, return first error
//! ```
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use singleshot::{Config, Host, ResolveError, RunFn, ScopeFn, TaskError};
//!
//! struct Migrator;
//!
//! # #[tokio::main(flavor = "current_thread", start_paused = true)]
//! # async fn main() {
//! let cfg = Config { handle_os_signals: false, ..Config::default() };
//! let mut host = Host::builder(cfg).build();
//! host.add_one_shot::<Migrator>(
//!     ScopeFn::arc(|| Ok::<_, ResolveError>(Migrator)),
//!     RunFn::arc(|_m: Migrator, _ctx: CancellationToken| async { Ok::<_, TaskError>(()) }),
//! )
//! .unwrap();
//!
//! assert!(host.run().await.is_ok());
//! # }
//! ```

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::{task::JoinHandle, time};
use tokio_util::sync::CancellationToken;

use crate::core::{
    config::Config,
    hosted::HostedService,
    service::OneShotService,
    shutdown::{self, ShutdownHandle, ShutdownSignal},
};
use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind};
use crate::scope::ScopeRef;
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::work::RunRef;

/// Builder for constructing a [`Host`].
pub struct HostBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl HostBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers for observability.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the host. Does not need a running tokio runtime.
    pub fn build(self) -> Host {
        Host {
            bus: Bus::new(self.cfg.bus_capacity_clamped()),
            cfg: self.cfg,
            subscribers: self.subscribers,
            shutdown: ShutdownHandle::new(),
            services: Vec::new(),
        }
    }
}

/// Owns registered services and drives their lifecycle.
pub struct Host {
    cfg: Config,
    bus: Bus,
    subscribers: Vec<Arc<dyn Subscribe>>,
    shutdown: ShutdownHandle,
    services: Vec<Arc<dyn HostedService>>,
}

impl Host {
    /// Returns a builder for a host with the given configuration.
    pub fn builder(cfg: Config) -> HostBuilder {
        HostBuilder::new(cfg)
    }

    /// The host's event bus.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Handle that makes [`Host::run`] proceed to stopping.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Registers a hosted service. Names must be unique.
    pub fn add_service(&mut self, service: Arc<dyn HostedService>) -> Result<(), RuntimeError> {
        if self.services.iter().any(|s| s.name() == service.name()) {
            return Err(RuntimeError::DuplicateService {
                service: service.name().to_string(),
            });
        }
        self.services.push(service);
        Ok(())
    }

    /// Registers a one-shot service for the unit-of-work type `T`.
    ///
    /// Only one one-shot service per `T` may be registered. The returned handle
    /// can be used to inspect the service state.
    pub fn add_one_shot<T: Send + 'static>(
        &mut self,
        scopes: ScopeRef<T>,
        work: RunRef<T>,
    ) -> Result<Arc<OneShotService<T>>, RuntimeError> {
        let service = Arc::new(OneShotService::new(
            &self.cfg,
            self.bus.clone(),
            scopes,
            work,
            Arc::new(self.shutdown.clone()),
        ));
        self.add_service(service.clone())?;
        Ok(service)
    }

    /// Runs all registered services until shutdown is requested, then stops them.
    ///
    /// Returns the first error from starting or stopping a service; for a
    /// one-shot service whose work did not complete this is
    /// [`RuntimeError::NotFinished`].
    pub async fn run(self) -> Result<(), RuntimeError> {
        let listener = self.spawn_listener();
        let start_ctx = CancellationToken::new();

        let mut started: Vec<Arc<dyn HostedService>> = Vec::with_capacity(self.services.len());
        let mut start_result = Ok(());
        for service in &self.services {
            match service.start(start_ctx.clone()).await {
                Ok(()) => started.push(Arc::clone(service)),
                Err(e) => {
                    start_result = Err(e);
                    break;
                }
            }
        }

        if start_result.is_ok() {
            self.bus.publish(Event::new(EventKind::HostStarted));
            self.wait_for_shutdown().await;
        }

        let stop_result = self.stop_all(&started).await;
        let result = start_result.and(stop_result);

        let mut stopped = Event::new(EventKind::HostStopped);
        if let Err(e) = &result {
            stopped = stopped.with_reason(e.to_string());
        }
        self.bus.publish(stopped);

        if let Some((done, handle)) = listener {
            done.cancel();
            if let Ok(set) = handle.await {
                set.shutdown().await;
            }
        }
        result
    }

    /// Waits for a shutdown request from a service, the handle, or the OS.
    async fn wait_for_shutdown(&self) {
        let os_signal = async {
            if self.cfg.handle_os_signals && shutdown::wait_for_shutdown_signal().await.is_ok() {
                return;
            }
            std::future::pending::<()>().await
        };

        tokio::select! {
            _ = self.shutdown.requested() => {}
            _ = os_signal => self.shutdown.request_shutdown(),
        }
    }

    /// Stops `started` in reverse order; the stop token is cancelled after `cfg.grace`.
    async fn stop_all(&self, started: &[Arc<dyn HostedService>]) -> Result<(), RuntimeError> {
        self.bus
            .publish(Event::new(EventKind::HostStopping).with_delay(self.cfg.grace));

        let ctx = CancellationToken::new();
        let timer = match self.cfg.stop_grace() {
            Some(grace) => {
                let ctx = ctx.clone();
                Some(tokio::spawn(async move {
                    time::sleep(grace).await;
                    ctx.cancel();
                }))
            }
            None => {
                ctx.cancel();
                None
            }
        };

        let mut first_err = None;
        for service in started.iter().rev() {
            if let Err(e) = service.stop(ctx.clone()).await {
                first_err.get_or_insert(e);
            }
        }

        if let Some(timer) = timer {
            timer.abort();
        }
        first_err.map_or(Ok(()), Err)
    }

    /// Subscribes to the bus and forwards events to the subscriber set.
    ///
    /// Once `done` is cancelled the listener drains what is already queued and
    /// hands the set back for shutdown. No listener runs without subscribers.
    fn spawn_listener(&self) -> Option<(CancellationToken, JoinHandle<SubscriberSet>)> {
        let set = SubscriberSet::new(self.subscribers.clone(), self.bus.clone());
        if set.is_empty() {
            return None;
        }
        let mut rx = self.bus.subscribe();
        let done = CancellationToken::new();
        let stop = done.clone();

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    ev = rx.recv() => match ev {
                        Ok(ev) => set.emit(&ev),
                        Err(RecvError::Lagged(_)) => continue,
                        Err(RecvError::Closed) => break,
                    },
                    _ = stop.cancelled() => {
                        while let Ok(ev) = rx.try_recv() {
                            set.emit(&ev);
                        }
                        break;
                    }
                }
            }
            set
        });
        Some((done, handle))
    }
}
