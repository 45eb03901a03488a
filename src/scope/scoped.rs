//! # Resolver contract.
//!
//! ```text
//! ScopeFactory::create_scope() ──► Box<dyn Scope<T>>
//!                                     ├─► resolve() ──► T | ResolveError
//!                                     └─► drop      ──► scope released
//! ```
//!
//! Disposal is `Drop`: implementors release whatever the scope owns
//! (connections, transactions, temp files) in their `Drop` impl.

use std::sync::Arc;

use crate::error::ResolveError;

/// Shared handle to a scope factory for `T`.
pub type ScopeRef<T> = Arc<dyn ScopeFactory<T>>;

/// Produces short-lived resolution scopes.
pub trait ScopeFactory<T>: Send + Sync + 'static {
    /// Creates a new scope. Called once per execution.
    fn create_scope(&self) -> Box<dyn Scope<T> + '_>;
}

/// A short-lived resolution context; released when dropped.
pub trait Scope<T>: Send {
    /// Resolves the unit-of-work dependency from this scope.
    fn resolve(&mut self) -> Result<T, ResolveError>;
}
