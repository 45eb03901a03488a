//! Error types used by the one-shot runtime, its scopes and units of work.
//!
//! This module defines three error enums:
//!
//! - [`ResolveError`]: a scope could not produce the unit-of-work dependency.
//! - [`TaskError`]: the single execution failed (absorbed by the controller).
//! - [`RuntimeError`]: errors surfaced by the controller and the host,
//!   most importantly [`RuntimeError::NotFinished`] at stop time.
//!
//! All of them provide `as_label` for logs/metrics; `TaskError` and
//! `RuntimeError` also provide `as_message`.

use thiserror::Error;

/// # Errors produced while resolving a unit of work from a scope.
///
/// A resolution failure is treated exactly like a failed execution:
/// the controller records it, still requests shutdown, and reports
/// [`RuntimeError::NotFinished`] at stop time.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Nothing is registered for the requested type.
    #[error("no service registered for {ty}")]
    Missing {
        /// Name of the requested type.
        ty: &'static str,
    },

    /// A registration exists but constructing the instance failed.
    #[error("failed to construct {ty}: {error}")]
    Construct {
        /// Name of the requested type.
        ty: &'static str,
        /// The underlying error message.
        error: String,
    },
}

impl ResolveError {
    /// Shorthand for [`ResolveError::Missing`] keyed by `T`'s type name.
    pub fn missing<T: ?Sized>() -> Self {
        ResolveError::Missing {
            ty: std::any::type_name::<T>(),
        }
    }

    /// Shorthand for [`ResolveError::Construct`] keyed by `T`'s type name.
    pub fn construct<T: ?Sized>(error: impl Into<String>) -> Self {
        ResolveError::Construct {
            ty: std::any::type_name::<T>(),
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ResolveError::Missing { .. } => "resolve_missing",
            ResolveError::Construct { .. } => "resolve_construct",
        }
    }
}

/// # Errors produced by the single execution of a unit of work.
///
/// None of these leave the controller: they are recorded, published as
/// `ServiceFailed`, and turn into [`RuntimeError::NotFinished`] at stop time.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum TaskError {
    /// The unit of work returned an error.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The unit of work observed cancellation and gave up.
    #[error("context cancelled")]
    Canceled,

    /// The unit of work panicked; the panic was caught by the controller.
    #[error("panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },

    /// The unit of work could not be resolved from its scope.
    #[error("resolution failed: {0}")]
    Resolve(#[from] ResolveError),
}

impl TaskError {
    /// Builds a [`TaskError::Fail`] from anything displayable.
    ///
    /// # Example
    /// ```
    /// use singleshot::TaskError;
    ///
    /// let err = TaskError::fail("disk full");
    /// assert_eq!(err.to_string(), "execution failed: disk full");
    /// ```
    pub fn fail(error: impl std::fmt::Display) -> Self {
        TaskError::Fail {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use singleshot::TaskError;
    ///
    /// assert_eq!(TaskError::Canceled.as_label(), "task_canceled");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Canceled => "task_canceled",
            TaskError::Panicked { .. } => "task_panicked",
            TaskError::Resolve(_) => "task_unresolved",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Canceled => "context cancelled".to_string(),
            TaskError::Panicked { info } => format!("panic: {info}"),
            TaskError::Resolve(e) => format!("unresolved: {e}"),
        }
    }
}

/// # Errors surfaced by the controller and the host.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// The unit of work did not run to completion before the service stopped.
    ///
    /// This is the signal-of-record that the one-shot task failed; hosts should
    /// turn it into a non-zero exit code.
    #[error("one-shot service {service} was not finished")]
    NotFinished {
        /// Name of the service that did not finish.
        service: String,
    },

    /// `start` was called on a controller that was already started.
    #[error("one-shot service {service} was already started")]
    AlreadyStarted {
        /// Name of the service.
        service: String,
    },

    /// A service with the same name is already registered with the host.
    #[error("service {service} is already registered")]
    DuplicateService {
        /// Name of the service.
        service: String,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use singleshot::RuntimeError;
    ///
    /// let err = RuntimeError::NotFinished { service: "import".into() };
    /// assert_eq!(err.as_label(), "runtime_not_finished");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::NotFinished { .. } => "runtime_not_finished",
            RuntimeError::AlreadyStarted { .. } => "runtime_already_started",
            RuntimeError::DuplicateService { .. } => "runtime_duplicate_service",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::NotFinished { service } => {
                format!("service {service} stopped before its work completed")
            }
            RuntimeError::AlreadyStarted { service } => {
                format!("service {service} started twice")
            }
            RuntimeError::DuplicateService { service } => {
                format!("service {service} registered twice")
            }
        }
    }

    /// Returns the process exit code a host should use for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            RuntimeError::NotFinished { .. } => 1,
            RuntimeError::AlreadyStarted { .. } | RuntimeError::DuplicateService { .. } => 2,
        }
    }
}
