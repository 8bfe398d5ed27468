//! Evaluator factory backed by a table of native functions

use exprtree_core::error::{Error, Result};
use exprtree_core::member::Member;
use exprtree_core::traits::{Callable, EvaluatorFactory, Failure};
use exprtree_core::value::Value;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;

/// Maps members to the native functions that evaluate them
///
/// A constructed generic member without an entry of its own falls back to
/// the entry of its generic definition.
#[derive(Default, Clone)]
pub struct FunctionRegistry {
    functions: FxHashMap<Member, Arc<dyn Callable>>,
}

impl FunctionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a closure as the evaluator of `member`
    pub fn register<F>(&mut self, member: Member, f: F)
    where
        F: Fn(&[Value]) -> std::result::Result<Value, Failure> + Send + Sync + 'static,
    {
        self.functions.insert(member, Arc::new(f));
    }

    /// Register an already shared callable
    pub fn register_callable(&mut self, member: Member, callable: Arc<dyn Callable>) {
        self.functions.insert(member, callable);
    }

    /// Builder form of [`FunctionRegistry::register`]
    pub fn with<F>(mut self, member: Member, f: F) -> Self
    where
        F: Fn(&[Value]) -> std::result::Result<Value, Failure> + Send + Sync + 'static,
    {
        self.register(member, f);
        self
    }

    /// Whether `member` can be compiled
    pub fn contains(&self, member: &Member) -> bool {
        self.lookup(member).is_some()
    }

    /// Number of registered members
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    fn lookup(&self, member: &Member) -> Option<&Arc<dyn Callable>> {
        self.functions.get(member).or_else(|| {
            member
                .generic_definition()
                .and_then(|definition| self.functions.get(definition))
        })
    }
}

impl EvaluatorFactory for FunctionRegistry {
    fn compile(&self, member: &Member) -> Result<Arc<dyn Callable>> {
        self.lookup(member)
            .cloned()
            .ok_or_else(|| Error::MissingEvaluator(member.to_string()))
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.functions.keys()).finish()
    }
}
