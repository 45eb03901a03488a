//! # Function-backed scope factory (`ScopeFn`)
//!
//! [`ScopeFn`] wraps a constructor closure `F: Fn() -> Result<T, ResolveError>`.
//! Each scope calls it to build a fresh `T`; values owned by `T` are dropped
//! together with the scope's result.
//!
//! ## Example
//! ```rust
//! use singleshot::{ResolveError, Scope, ScopeFactory, ScopeFn};
//!
//! let factory = ScopeFn::new(|| Ok::<_, ResolveError>(String::from("ready")));
//! let mut scope: Box<dyn Scope<String> + '_> = factory.create_scope();
//! assert_eq!(scope.resolve().unwrap(), "ready");
//! ```

use std::sync::Arc;

use crate::error::ResolveError;
use crate::scope::scoped::{Scope, ScopeFactory};

/// Closure-backed [`ScopeFactory`].
#[derive(Debug)]
pub struct ScopeFn<F> {
    f: F,
}

impl<F> ScopeFn<F> {
    /// Creates a factory from a constructor closure.
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the factory and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

/// Scope produced by [`ScopeFn`]; resolves at most once.
struct FnScope<'a, F> {
    f: &'a F,
    resolved: bool,
}

impl<T, F> Scope<T> for FnScope<'_, F>
where
    F: Fn() -> Result<T, ResolveError> + Send + Sync,
{
    fn resolve(&mut self) -> Result<T, ResolveError> {
        if self.resolved {
            return Err(ResolveError::construct::<T>("scope already resolved its service"));
        }
        self.resolved = true;
        (self.f)()
    }
}

impl<T, F> ScopeFactory<T> for ScopeFn<F>
where
    T: 'static,
    F: Fn() -> Result<T, ResolveError> + Send + Sync + 'static,
{
    fn create_scope(&self) -> Box<dyn Scope<T> + '_> {
        Box::new(FnScope {
            f: &self.f,
            resolved: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_scope_builds_a_fresh_instance() {
        let factory = ScopeFn::new(|| Ok::<_, ResolveError>(vec![1u8]));

        let mut first: Box<dyn Scope<Vec<u8>> + '_> = factory.create_scope();
        let mut second: Box<dyn Scope<Vec<u8>> + '_> = factory.create_scope();
        let mut a = first.resolve().unwrap();
        a.push(2);
        assert_eq!(second.resolve().unwrap(), vec![1u8]);
    }

    #[test]
    fn second_resolve_in_the_same_scope_is_rejected() {
        let factory = ScopeFn::new(|| Ok::<_, ResolveError>(1u32));
        let mut scope: Box<dyn Scope<u32> + '_> = factory.create_scope();
        assert!(scope.resolve().is_ok());
        assert!(matches!(scope.resolve(), Err(ResolveError::Construct { .. })));
    }

    #[test]
    fn constructor_errors_pass_through() {
        let factory = ScopeFn::new(|| Err::<u32, _>(ResolveError::missing::<u32>()));
        let mut scope: Box<dyn Scope<u32> + '_> = factory.create_scope();
        assert_eq!(scope.resolve(), Err(ResolveError::missing::<u32>()));
    }
}
