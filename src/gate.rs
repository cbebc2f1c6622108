//! Context gates decide whether the cache may touch its store.
//!
//! Outside an active scope the cache bypasses itself entirely and every call
//! goes straight to the source.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

/// Reports whether a caching scope is currently active.
pub trait ContextGate: Send + Sync {
    fn is_active(&self) -> bool;
}

/// Caching is always available.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysActive;

impl ContextGate for AlwaysActive {
    fn is_active(&self) -> bool {
        true
    }
}

/// Caching is never available.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverActive;

impl ContextGate for NeverActive {
    fn is_active(&self) -> bool {
        false
    }
}

/// Active on a thread while that thread holds at least one [`CacheScope`].
///
/// A service enters a scope for each request it handles. Calls made on other
/// threads, or outside any request, run uncached.
#[derive(Debug, Default)]
pub struct ScopedGate {
    depths: Mutex<HashMap<ThreadId, usize>>,
}

impl ScopedGate {
    pub fn new() -> Self {
        Self::default()
    }

    fn depths(&self) -> MutexGuard<'_, HashMap<ThreadId, usize>> {
        self.depths.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Open a caching scope on the current thread until the handle is dropped.
    pub fn enter(&self) -> CacheScope<'_> {
        let thread = thread::current().id();
        *self.depths().entry(thread).or_default() += 1;
        CacheScope {
            gate: self,
            thread,
            _not_send: PhantomData,
        }
    }

    /// Number of scopes currently open across all threads.
    pub fn open_scopes(&self) -> usize {
        self.depths().values().sum()
    }
}

impl ContextGate for ScopedGate {
    fn is_active(&self) -> bool {
        self.depths()
            .get(&thread::current().id())
            .is_some_and(|depth| *depth > 0)
    }
}

/// Handle for an open caching scope.
///
/// Closes on the thread that opened it, so it is neither `Send` nor `Sync`.
#[must_use = "the scope closes as soon as the handle is dropped"]
#[derive(Debug)]
pub struct CacheScope<'a> {
    gate: &'a ScopedGate,
    thread: ThreadId,
    _not_send: PhantomData<*const ()>,
}

impl Drop for CacheScope<'_> {
    fn drop(&mut self) {
        let mut depths = self.gate.depths();
        if let Some(depth) = depths.get_mut(&self.thread) {
            *depth -= 1;
            if *depth == 0 {
                depths.remove(&self.thread);
            }
        }
    }
}

impl<G: ContextGate + ?Sized> ContextGate for &G {
    fn is_active(&self) -> bool {
        (**self).is_active()
    }
}

impl<G: ContextGate + ?Sized> ContextGate for std::sync::Arc<G> {
    fn is_active(&self) -> bool {
        (**self).is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn fixed_gates() {
        assert!(AlwaysActive.is_active());
        assert!(!NeverActive.is_active());
    }

    #[test]
    fn scoped_gate_inactive_by_default() {
        let gate = ScopedGate::new();
        assert!(!gate.is_active());
    }

    #[test]
    fn scoped_gate_tracks_nested_scopes() {
        let gate = ScopedGate::new();
        {
            let _outer = gate.enter();
            assert!(gate.is_active());
            {
                let _inner = gate.enter();
                assert_eq!(gate.open_scopes(), 2);
            }
            assert!(gate.is_active());
        }
        assert!(!gate.is_active());
    }

    #[test]
    fn scope_is_local_to_its_thread() {
        let gate = Arc::new(ScopedGate::new());
        let _scope = gate.enter();
        assert!(gate.is_active());

        let other = gate.clone();
        let active_elsewhere = std::thread::spawn(move || other.is_active())
            .join()
            .unwrap();
        assert!(!active_elsewhere);
        assert_eq!(gate.open_scopes(), 1);
    }

    #[test]
    fn shared_gate_through_arc() {
        let gate = Arc::new(ScopedGate::new());
        let shared: Arc<dyn ContextGate> = gate.clone();
        assert!(!shared.is_active());
        let _scope = gate.enter();
        assert!(shared.is_active());
    }
}
