//! # Units of work.
//!
//! This module provides the abstraction for the action a one-shot service runs:
//! - [`RunScoped`] - trait that runs a resolved dependency once, cancellably
//! - [`RunFn`] - closure-backed implementation
//! - [`RunRef`] - shared handle (`Arc<dyn RunScoped<T>>`)

mod run;
mod run_fn;

pub use run::{RunRef, RunScoped};
pub use run_fn::RunFn;
