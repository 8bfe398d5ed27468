//! Memoizing evaluator factory
//!
//! Compiling a member can be expensive for reflective hosts. The cache is
//! shared between optimizers on different threads, so it sits behind a
//! read-write lock.

use exprtree_core::error::Result;
use exprtree_core::member::Member;
use exprtree_core::traits::{Callable, EvaluatorFactory};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Cache hit and miss counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: usize,
    /// Lookups forwarded to the inner factory
    pub misses: usize,
}

/// Wraps a factory and remembers every callable it compiled
///
/// Compile errors are not cached.
pub struct CachedEvaluatorFactory<F> {
    inner: F,
    cache: RwLock<FxHashMap<Member, Arc<dyn Callable>>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl<F: EvaluatorFactory> CachedEvaluatorFactory<F> {
    /// Wrap `inner`
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            cache: RwLock::new(FxHashMap::default()),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    /// Wrapped factory
    pub fn inner(&self) -> &F {
        &self.inner
    }

    /// Number of cached callables
    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    /// Whether nothing is cached yet
    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }

    /// Drop every cached callable
    pub fn clear(&self) {
        self.cache.write().clear();
    }

    /// Hit and miss counts so far
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl<F: EvaluatorFactory> EvaluatorFactory for CachedEvaluatorFactory<F> {
    fn compile(&self, member: &Member) -> Result<Arc<dyn Callable>> {
        if let Some(callable) = self.cache.read().get(member) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(callable.clone());
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let callable = self.inner.compile(member)?;
        Ok(self
            .cache
            .write()
            .entry(member.clone())
            .or_insert(callable)
            .clone())
    }
}
