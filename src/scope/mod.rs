//! # Scoped resolution.
//!
//! The controller never constructs its unit-of-work dependency itself. It asks a
//! [`ScopeFactory`] for a fresh [`Scope`], resolves one `T` from it and drops
//! the scope when the execution ends, on every exit path.
//!
//! - [`ScopeFactory`] / [`Scope`] - the resolver contract
//! - [`ScopeFn`] - closure-backed factory for applications without a container

mod scope_fn;
mod scoped;

pub use scope_fn::ScopeFn;
pub use scoped::{Scope, ScopeFactory, ScopeRef};
