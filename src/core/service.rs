//! # OneShotService: run a unit of work exactly once, then shut the host down.
//!
//! ## Lifecycle
//! ```text
//! start(ctx)
//!   ├─► publish ServiceStarting
//!   └─► tokio::spawn(execute(stopping))          (start returns immediately)
//!
//! execute(stopping)
//!   ├─► publish ServiceExecuting                 NotStarted ──► Running
//!   ├─► scope = scopes.create_scope()
//!   │     ├─► service = scope.resolve()          Err ─┐
//!   │     └─► work.run_scoped(service, stopping) Err ─┤ (panics caught too)
//!   │   drop(scope) ─► publish ScopeReleased          │
//!   ├─► Ok  ─► finished = true, publish ServiceFinished   Running ──► Completed
//!   ├─► Err ─► publish ServiceFailed                      Running ──► Failed
//!   ├─► publish ShutdownScheduled
//!   ├─► sleep(shutdown_delay)                    (never cut short by cancellation)
//!   └─► publish ShutdownRequested, shutdown.request_shutdown()
//!
//! stop(ctx)
//!   ├─► publish ServiceStopping
//!   ├─► stopping.cancel()
//!   ├─► await execute task (or ctx cancelled)
//!   └─► finished ? Ok(()) : publish ServiceNotFinished, Err(NotFinished)
//! ```
//!
//! ## Rules
//! - Errors from resolution or execution never leave the execution task.
//! - Shutdown is requested exactly once, at least `shutdown_delay` after the work settled.
//! - Only `stop` surfaces an error: [`RuntimeError::NotFinished`].
//! - A second `start` is rejected; concurrent `stop` calls are a caller contract violation.

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use tokio::{sync::Mutex, task::JoinHandle, time};
use tokio_util::sync::CancellationToken;

use crate::core::{
    completion::CompletionFlag,
    config::Config,
    hosted::HostedService,
    shutdown::ShutdownSignal,
    state::{ExecutionState, StateCell},
};
use crate::error::{ResolveError, RuntimeError, TaskError};
use crate::events::{Bus, Event, EventKind};
use crate::scope::{Scope, ScopeRef};
use crate::subscribers::panic_message;
use crate::work::RunRef;

/// Runs one unit of work over a scoped `T` exactly once and couples its
/// outcome to host shutdown.
///
/// ## Example
/// ```rust
/// use std::sync::Arc;
/// use std::time::Duration;
/// use tokio_util::sync::CancellationToken;
/// use singleshot::{
///     Bus, Config, HostedService, OneShotService, ResolveError, RunFn, ScopeFn,
///     ShutdownHandle, TaskError,
/// };
///
/// struct Report;
///
/// # #[tokio::main(flavor = "current_thread", start_paused = true)]
/// # async fn main() {
/// let shutdown = ShutdownHandle::new();
/// let service = OneShotService::<Report>::new(
///     &Config::default(),
///     Bus::default(),
///     ScopeFn::arc(|| Ok::<_, ResolveError>(Report)),
///     RunFn::arc(|_report: Report, _ctx: CancellationToken| async { Ok::<_, TaskError>(()) }),
///     Arc::new(shutdown.clone()),
/// )
/// .with_shutdown_delay(Duration::from_millis(10));
///
/// service.start(CancellationToken::new()).await.unwrap();
/// shutdown.requested().await;
/// assert!(service.stop(CancellationToken::new()).await.is_ok());
/// # }
/// ```
pub struct OneShotService<T: Send + 'static> {
    name: Arc<str>,
    scopes: ScopeRef<T>,
    work: RunRef<T>,
    shutdown: Arc<dyn ShutdownSignal>,
    bus: Bus,
    shutdown_delay: Duration,

    state: Arc<StateCell>,
    finished: Arc<CompletionFlag>,
    started: AtomicBool,
    stopping: CancellationToken,
    execution: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Send + 'static> OneShotService<T> {
    /// Creates a service named after `T`, using `cfg.shutdown_delay`.
    pub fn new(
        cfg: &Config,
        bus: Bus,
        scopes: ScopeRef<T>,
        work: RunRef<T>,
        shutdown: Arc<dyn ShutdownSignal>,
    ) -> Self {
        Self {
            name: Arc::from(std::any::type_name::<T>()),
            scopes,
            work,
            shutdown,
            bus,
            shutdown_delay: cfg.shutdown_delay,
            state: Arc::new(StateCell::new()),
            finished: Arc::new(CompletionFlag::new()),
            started: AtomicBool::new(false),
            stopping: CancellationToken::new(),
            execution: Mutex::new(None),
        }
    }

    /// Overrides the service name used in events and errors.
    pub fn with_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Overrides the grace delay before shutdown is requested.
    pub fn with_shutdown_delay(mut self, delay: Duration) -> Self {
        self.shutdown_delay = delay;
        self
    }

    /// Current execution state.
    pub fn state(&self) -> ExecutionState {
        self.state.get()
    }

    /// `true` once the unit of work ran to completion.
    pub fn is_finished(&self) -> bool {
        self.finished.is_set()
    }

    /// Grace delay before shutdown is requested.
    pub fn shutdown_delay(&self) -> Duration {
        self.shutdown_delay
    }

    fn publish(&self, kind: EventKind) {
        self.bus
            .publish(Event::new(kind).with_service(Arc::clone(&self.name)));
    }

    fn execution_task(&self) -> Execution<T> {
        Execution {
            name: Arc::clone(&self.name),
            scopes: Arc::clone(&self.scopes),
            work: Arc::clone(&self.work),
            shutdown: Arc::clone(&self.shutdown),
            bus: self.bus.clone(),
            shutdown_delay: self.shutdown_delay,
            state: Arc::clone(&self.state),
            finished: Arc::clone(&self.finished),
        }
    }

    fn ensure_finished(&self) -> Result<(), RuntimeError> {
        if self.finished.is_set() {
            return Ok(());
        }
        self.publish(EventKind::ServiceNotFinished);
        Err(RuntimeError::NotFinished {
            service: self.name.to_string(),
        })
    }
}

impl<T: Send + 'static> fmt::Debug for OneShotService<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OneShotService")
            .field("name", &self.name)
            .field("state", &self.state())
            .field("shutdown_delay", &self.shutdown_delay)
            .finish()
    }
}

#[async_trait]
impl<T: Send + 'static> HostedService for OneShotService<T> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self, _ctx: CancellationToken) -> Result<(), RuntimeError> {
        if self.started.swap(true, Ordering::AcqRel) {
            return Err(RuntimeError::AlreadyStarted {
                service: self.name.to_string(),
            });
        }
        self.publish(EventKind::ServiceStarting);

        let handle = tokio::spawn(self.execution_task().run(self.stopping.clone()));
        *self.execution.lock().await = Some(handle);
        Ok(())
    }

    async fn stop(&self, ctx: CancellationToken) -> Result<(), RuntimeError> {
        self.publish(EventKind::ServiceStopping);
        self.stopping.cancel();

        let handle = self.execution.lock().await.take();
        if let Some(mut handle) = handle {
            tokio::select! {
                _ = &mut handle => {}
                _ = ctx.cancelled() => {}
            }
        }
        self.ensure_finished()
    }
}

/// Everything the spawned execution task owns.
struct Execution<T> {
    name: Arc<str>,
    scopes: ScopeRef<T>,
    work: RunRef<T>,
    shutdown: Arc<dyn ShutdownSignal>,
    bus: Bus,
    shutdown_delay: Duration,
    state: Arc<StateCell>,
    finished: Arc<CompletionFlag>,
}

impl<T: Send + 'static> Execution<T> {
    async fn run(self, stopping: CancellationToken) {
        self.state
            .transition(ExecutionState::NotStarted, ExecutionState::Running);
        self.publish(Event::new(EventKind::ServiceExecuting));

        let outcome = AssertUnwindSafe(self.run_scoped(stopping))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| {
                Err(TaskError::Panicked {
                    info: panic_message(&*panic),
                })
            });

        match outcome {
            Ok(()) => {
                self.finished.set();
                self.state
                    .transition(ExecutionState::Running, ExecutionState::Completed);
                self.publish(Event::new(EventKind::ServiceFinished));
            }
            Err(e) => {
                self.state
                    .transition(ExecutionState::Running, ExecutionState::Failed);
                self.publish(Event::new(EventKind::ServiceFailed).with_reason(e.to_string()));
            }
        }

        // The host may still be starting; this wait ignores `stopping`.
        self.publish(Event::new(EventKind::ShutdownScheduled).with_delay(self.shutdown_delay));
        time::sleep(self.shutdown_delay).await;

        self.publish(Event::new(EventKind::ShutdownRequested));
        self.shutdown.request_shutdown();
    }

    async fn run_scoped(&self, stopping: CancellationToken) -> Result<(), TaskError> {
        let mut scope = ScopeGuard {
            scope: Some(self.scopes.create_scope()),
            name: &self.name,
            bus: &self.bus,
        };
        let service = scope.resolve()?;
        self.work.run_scoped(service, stopping).await
    }

    fn publish(&self, ev: Event) {
        self.bus.publish(ev.with_service(Arc::clone(&self.name)));
    }
}

/// Owns the scope for one execution; releases it, then publishes `ScopeReleased`.
struct ScopeGuard<'a, T> {
    scope: Option<Box<dyn Scope<T> + 'a>>,
    name: &'a Arc<str>,
    bus: &'a Bus,
}

impl<T> ScopeGuard<'_, T> {
    fn resolve(&mut self) -> Result<T, ResolveError> {
        match self.scope.as_mut() {
            Some(scope) => scope.resolve(),
            None => Err(ResolveError::construct::<T>("scope already released")),
        }
    }
}

impl<T> Drop for ScopeGuard<'_, T> {
    fn drop(&mut self) {
        drop(self.scope.take());
        self.bus
            .publish(Event::new(EventKind::ScopeReleased).with_service(Arc::clone(self.name)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::{ScopeFactory, ScopeFn};
    use crate::work::RunFn;
    use std::sync::Mutex as StdMutex;
    use tokio::time::Instant;

    const DELAY: Duration = Duration::from_secs(1);

    #[derive(Debug)]
    struct Job;

    /// Records every shutdown request with its (virtual) time.
    #[derive(Default)]
    struct RecordingSignal {
        requests: StdMutex<Vec<Instant>>,
    }

    impl RecordingSignal {
        fn count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        fn first(&self) -> Option<Instant> {
            self.requests.lock().unwrap().first().copied()
        }
    }

    impl ShutdownSignal for RecordingSignal {
        fn request_shutdown(&self) {
            self.requests.lock().unwrap().push(Instant::now());
        }
    }

    fn explode() -> Result<(), TaskError> {
        panic!("unit of work exploded")
    }

    fn ok_work() -> RunRef<Job> {
        RunFn::arc(|_job: Job, _ctx: CancellationToken| async { Ok::<_, TaskError>(()) })
    }

    fn job_scopes() -> ScopeRef<Job> {
        ScopeFn::arc(|| Ok::<_, ResolveError>(Job))
    }

    fn build(
        scopes: ScopeRef<Job>,
        work: RunRef<Job>,
    ) -> (OneShotService<Job>, Arc<RecordingSignal>, Bus) {
        let bus = Bus::new(64);
        let signal = Arc::new(RecordingSignal::default());
        let svc = OneShotService::new(&Config::default(), bus.clone(), scopes, work, signal.clone())
            .with_name("job");
        (svc, signal, bus)
    }

    fn drain(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<EventKind> {
        let mut kinds = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            kinds.push(ev.kind);
        }
        kinds
    }

    #[tokio::test(start_paused = true)]
    async fn completed_work_requests_shutdown_and_stops_cleanly() {
        let (svc, signal, bus) = build(job_scopes(), ok_work());
        let mut rx = bus.subscribe();

        let t0 = Instant::now();
        svc.start(CancellationToken::new()).await.unwrap();
        time::sleep(DELAY + Duration::from_millis(10)).await;

        assert_eq!(signal.count(), 1);
        assert!(signal.first().unwrap() >= t0 + DELAY);
        assert_eq!(svc.state(), ExecutionState::Completed);
        assert!(svc.stop(CancellationToken::new()).await.is_ok());

        assert_eq!(
            drain(&mut rx),
            vec![
                EventKind::ServiceStarting,
                EventKind::ServiceExecuting,
                EventKind::ScopeReleased,
                EventKind::ServiceFinished,
                EventKind::ShutdownScheduled,
                EventKind::ShutdownRequested,
                EventKind::ServiceStopping,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn failed_work_still_requests_shutdown_but_stop_reports_not_finished() {
        let work: RunRef<Job> = RunFn::arc(|_job: Job, _ctx: CancellationToken| async {
            Err::<(), _>(TaskError::fail("boom"))
        });
        let (svc, signal, bus) = build(job_scopes(), work);
        let mut rx = bus.subscribe();

        svc.start(CancellationToken::new()).await.unwrap();
        time::sleep(DELAY + Duration::from_millis(10)).await;

        assert_eq!(signal.count(), 1);
        assert_eq!(svc.state(), ExecutionState::Failed);
        let err = svc.stop(CancellationToken::new()).await.unwrap_err();
        assert_eq!(
            err,
            RuntimeError::NotFinished {
                service: "job".into()
            }
        );

        let mut failed = None;
        let mut kinds = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            if ev.kind == EventKind::ServiceFailed {
                failed = ev.reason.clone();
            }
            kinds.push(ev.kind);
        }
        assert_eq!(failed.as_deref(), Some("execution failed: boom"));
        assert!(kinds.ends_with(&[EventKind::ServiceStopping, EventKind::ServiceNotFinished]));
    }

    #[tokio::test(start_paused = true)]
    async fn resolution_failure_behaves_like_failed_work() {
        let invoked = Arc::new(AtomicBool::new(false));
        let seen = invoked.clone();
        let work: RunRef<Job> = RunFn::arc(move |_job: Job, _ctx: CancellationToken| {
            let seen = seen.clone();
            async move {
                seen.store(true, Ordering::SeqCst);
                Ok::<_, TaskError>(())
            }
        });
        let scopes: ScopeRef<Job> = ScopeFn::arc(|| Err::<Job, _>(ResolveError::missing::<Job>()));
        let (svc, signal, _bus) = build(scopes, work);

        svc.start(CancellationToken::new()).await.unwrap();
        time::sleep(DELAY + Duration::from_millis(10)).await;

        assert!(!invoked.load(Ordering::SeqCst));
        assert_eq!(signal.count(), 1);
        assert_eq!(svc.state(), ExecutionState::Failed);
        assert!(matches!(
            svc.stop(CancellationToken::new()).await,
            Err(RuntimeError::NotFinished { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_work_is_absorbed() {
        let work: RunRef<Job> =
            RunFn::arc(|_job: Job, _ctx: CancellationToken| async { explode() });
        let (svc, signal, _bus) = build(job_scopes(), work);

        svc.start(CancellationToken::new()).await.unwrap();
        time::sleep(DELAY + Duration::from_millis(10)).await;

        assert_eq!(signal.count(), 1);
        assert_eq!(svc.state(), ExecutionState::Failed);
        assert!(svc.stop(CancellationToken::new()).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_waits_delay_after_work_settles() {
        let work: RunRef<Job> = RunFn::arc(|_job: Job, _ctx: CancellationToken| async {
            time::sleep(Duration::from_secs(5)).await;
            Ok::<_, TaskError>(())
        });
        let (svc, signal, _bus) = build(job_scopes(), work);

        let t0 = Instant::now();
        svc.start(CancellationToken::new()).await.unwrap();

        time::sleep(Duration::from_secs(5) + DELAY / 2).await;
        assert!(svc.is_finished());
        assert_eq!(signal.count(), 0);

        time::sleep(DELAY).await;
        assert_eq!(signal.count(), 1);
        assert!(signal.first().unwrap() >= t0 + Duration::from_secs(5) + DELAY);
    }

    #[tokio::test(start_paused = true)]
    async fn start_returns_before_work_and_passes_cancellation_through() {
        let work: RunRef<Job> = RunFn::arc(|_job: Job, ctx: CancellationToken| async move {
            tokio::select! {
                _ = time::sleep(Duration::from_secs(3600)) => Ok(()),
                _ = ctx.cancelled() => Err(TaskError::Canceled),
            }
        });
        let (svc, signal, _bus) = build(job_scopes(), work);

        time::timeout(Duration::from_millis(1), svc.start(CancellationToken::new()))
            .await
            .expect("start must not wait for the unit of work")
            .unwrap();
        assert!(!svc.is_finished());

        let t0 = Instant::now();
        let res = svc.stop(CancellationToken::new()).await;

        // The work honored cancellation, but the grace delay still ran in full.
        assert!(Instant::now() >= t0 + DELAY);
        assert_eq!(signal.count(), 1);
        assert_eq!(svc.state(), ExecutionState::Failed);
        assert!(matches!(res, Err(RuntimeError::NotFinished { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_gives_up_waiting_when_its_token_is_cancelled() {
        let work: RunRef<Job> = RunFn::arc(|_job: Job, _ctx: CancellationToken| async {
            time::sleep(Duration::from_secs(3600)).await;
            Ok::<_, TaskError>(())
        });
        let (svc, _signal, _bus) = build(job_scopes(), work);
        svc.start(CancellationToken::new()).await.unwrap();

        let ctx = CancellationToken::new();
        let cancel = ctx.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_millis(100)).await;
            cancel.cancel();
        });

        let t0 = Instant::now();
        let res = svc.stop(ctx).await;
        assert!(Instant::now() < t0 + Duration::from_secs(1));
        assert_eq!(svc.state(), ExecutionState::Running);
        assert!(matches!(res, Err(RuntimeError::NotFinished { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_stop_only_rechecks() {
        let (svc, signal, _bus) = build(job_scopes(), ok_work());

        svc.start(CancellationToken::new()).await.unwrap();
        time::sleep(DELAY * 2).await;

        assert!(svc.stop(CancellationToken::new()).await.is_ok());
        assert!(svc.stop(CancellationToken::new()).await.is_ok());
        assert_eq!(signal.count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_without_start_reports_not_finished() {
        let (svc, signal, _bus) = build(job_scopes(), ok_work());

        assert!(svc.stop(CancellationToken::new()).await.is_err());
        assert_eq!(svc.state(), ExecutionState::NotStarted);
        assert_eq!(signal.count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn second_start_is_rejected() {
        let (svc, signal, _bus) = build(job_scopes(), ok_work());

        svc.start(CancellationToken::new()).await.unwrap();
        let err = svc.start(CancellationToken::new()).await.unwrap_err();
        assert_eq!(err.as_label(), "runtime_already_started");

        time::sleep(DELAY * 3).await;
        assert_eq!(signal.count(), 1);
    }

    struct TrackedScopes {
        released: Arc<AtomicBool>,
    }

    struct TrackedScope {
        released: Arc<AtomicBool>,
    }

    impl Scope<Job> for TrackedScope {
        fn resolve(&mut self) -> Result<Job, ResolveError> {
            Ok(Job)
        }
    }

    impl Drop for TrackedScope {
        fn drop(&mut self) {
            self.released.store(true, Ordering::SeqCst);
        }
    }

    impl ScopeFactory<Job> for TrackedScopes {
        fn create_scope(&self) -> Box<dyn Scope<Job> + '_> {
            Box::new(TrackedScope {
                released: self.released.clone(),
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn scope_is_released_when_work_fails() {
        let released = Arc::new(AtomicBool::new(false));
        let scopes: ScopeRef<Job> = Arc::new(TrackedScopes {
            released: released.clone(),
        });
        let work: RunRef<Job> = RunFn::arc(|_job: Job, _ctx: CancellationToken| async {
            Err::<(), _>(TaskError::fail("nope"))
        });
        let (svc, _signal, _bus) = build(scopes, work);

        svc.start(CancellationToken::new()).await.unwrap();
        time::sleep(Duration::from_millis(10)).await;

        assert!(released.load(Ordering::SeqCst));
        assert_eq!(svc.state(), ExecutionState::Failed);
    }

    /// Scope that records, on drop, whether `ScopeReleased` was already on the bus.
    struct WatchingScope {
        rx: tokio::sync::broadcast::Receiver<Event>,
        released_early: Arc<AtomicBool>,
    }

    impl Scope<Job> for WatchingScope {
        fn resolve(&mut self) -> Result<Job, ResolveError> {
            Ok(Job)
        }
    }

    impl Drop for WatchingScope {
        fn drop(&mut self) {
            while let Ok(ev) = self.rx.try_recv() {
                if ev.kind == EventKind::ScopeReleased {
                    self.released_early.store(true, Ordering::SeqCst);
                }
            }
        }
    }

    struct WatchingScopes {
        bus: Bus,
        released_early: Arc<AtomicBool>,
    }

    impl ScopeFactory<Job> for WatchingScopes {
        fn create_scope(&self) -> Box<dyn Scope<Job> + '_> {
            Box::new(WatchingScope {
                rx: self.bus.subscribe(),
                released_early: self.released_early.clone(),
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn scope_is_dropped_before_release_is_published() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let released_early = Arc::new(AtomicBool::new(false));
        let scopes: ScopeRef<Job> = Arc::new(WatchingScopes {
            bus: bus.clone(),
            released_early: released_early.clone(),
        });
        let svc = OneShotService::new(
            &Config::default(),
            bus.clone(),
            scopes,
            ok_work(),
            Arc::new(RecordingSignal::default()),
        );

        svc.start(CancellationToken::new()).await.unwrap();
        time::sleep(Duration::from_millis(10)).await;

        assert!(!released_early.load(Ordering::SeqCst));
        assert!(drain(&mut rx).contains(&EventKind::ScopeReleased));
    }

    #[test]
    fn name_defaults_to_type_name() {
        let svc = OneShotService::new(
            &Config::default(),
            Bus::new(1),
            job_scopes(),
            ok_work(),
            Arc::new(RecordingSignal::default()),
        );
        assert!(svc.name().ends_with("Job"));
        assert_eq!(svc.shutdown_delay(), DELAY);

        let debug = format!("{svc:?}");
        assert!(debug.contains("Job"));
        assert!(debug.contains("NotStarted"));
    }
}
