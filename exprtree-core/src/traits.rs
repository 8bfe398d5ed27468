//! Capability traits consumed by the optimizer
//!
//! The optimizer never decides on its own whether a library member is pure
//! or how to run it. It asks a [`SemanticProvider`] for facts and an
//! [`EvaluatorFactory`] for something it can call.

use crate::ast::Expr;
use crate::error::Result;
use crate::member::{Member, ParameterRef};
use crate::types::Type;
use crate::value::{ExceptionValue, Value};
use std::sync::Arc;

/// Static facts about expressions, members, parameters and types
pub trait SemanticProvider: Send + Sync {
    /// Evaluating the expression has no observable side effect; it may still
    /// throw deterministically
    fn is_pure(&self, expr: &Expr) -> bool;

    /// Calling or reading the member has no observable side effect
    fn is_pure_member(&self, member: &Member) -> bool;

    /// Creating a default instance of the value type has no side effect
    fn is_pure_type(&self, ty: &Type) -> bool;

    /// Statically known value of the expression
    fn constant_value(&self, expr: &Expr) -> Option<Value>;

    /// Whether the expression has a statically known value
    fn has_constant_value(&self, expr: &Expr) -> bool {
        self.constant_value(expr).is_some()
    }

    /// The expression always evaluates to null
    fn is_always_null(&self, expr: &Expr) -> bool;

    /// The expression never evaluates to null
    fn is_never_null(&self, expr: &Expr) -> bool;

    /// The expression unconditionally raises an exception and does nothing
    /// else
    fn always_throws(&self, expr: &Expr) -> bool;

    /// The expression never raises an exception
    fn never_throws(&self, expr: &Expr) -> bool;

    /// Calling or reading the member never raises an exception
    fn never_throws_member(&self, member: &Member) -> bool;

    /// The expression is a function returning its single argument
    fn is_identity_function(&self, expr: &Expr) -> bool;

    /// The parameter is only read by its member, never mutated or retained
    fn is_const_parameter(&self, parameter: &ParameterRef) -> bool;

    /// Values of the type cannot be mutated after construction
    fn is_immutable_type(&self, ty: &Type) -> bool;

    /// Constant `false`
    fn is_false(&self, expr: &Expr) -> bool {
        matches!(self.constant_value(expr), Some(Value::Boolean(false)))
    }

    /// Constant `true`
    fn is_true(&self, expr: &Expr) -> bool {
        matches!(self.constant_value(expr), Some(Value::Boolean(true)))
    }

    /// Constant zero of a numeric type
    fn is_zero(&self, expr: &Expr) -> bool {
        match self.constant_value(expr) {
            Some(Value::Float64(x)) => x == 0.0,
            Some(value) => value.as_i64() == Some(0),
            None => false,
        }
    }

    /// Constant one of a numeric type
    fn is_one(&self, expr: &Expr) -> bool {
        match self.constant_value(expr) {
            Some(Value::Float64(x)) => x == 1.0,
            Some(value) => value.as_i64() == Some(1),
            None => false,
        }
    }

    /// Constant whose bits are all zero
    fn all_bits_zero(&self, expr: &Expr) -> bool {
        match self.constant_value(expr) {
            Some(Value::Boolean(b)) => !b,
            Some(value) => value.as_i64() == Some(0),
            None => false,
        }
    }

    /// Constant whose bits are all one
    fn all_bits_one(&self, expr: &Expr) -> bool {
        match self.constant_value(expr) {
            Some(Value::Boolean(b)) => b,
            Some(value) => value.as_i64() == Some(-1),
            None => false,
        }
    }

    /// Constant equal to the minimum value of its type
    fn is_min_value(&self, expr: &Expr) -> bool {
        match self.constant_value(expr) {
            Some(Value::Int32(i)) => i == i32::MIN,
            Some(Value::Int64(i)) => i == i64::MIN,
            Some(Value::Float64(x)) => x == f64::MIN,
            Some(Value::Char(c)) => c == '\0',
            _ => false,
        }
    }

    /// Constant equal to the maximum value of its type
    fn is_max_value(&self, expr: &Expr) -> bool {
        match self.constant_value(expr) {
            Some(Value::Int32(i)) => i == i32::MAX,
            Some(Value::Int64(i)) => i == i64::MAX,
            Some(Value::Float64(x)) => x == f64::MAX,
            Some(Value::Char(c)) => c == char::MAX,
            _ => false,
        }
    }
}

/// Exception raised by a [`Callable`]
#[derive(Debug, Clone, PartialEq)]
pub struct Failure(pub Arc<ExceptionValue>);

impl Failure {
    /// Failure carrying a new exception of type `ty`
    pub fn new(ty: Type, message: impl Into<String>) -> Self {
        Self(Arc::new(ExceptionValue::new(ty, message)))
    }

    /// Failure wrapped the way reflective invocation reports it
    pub fn wrapped(self) -> Self {
        Self(Arc::new(ExceptionValue::invocation_wrapper(self.0)))
    }

    /// The exception the callee actually raised: one invocation-wrapper
    /// layer is stripped when present
    pub fn unwrap_invocation(self) -> Arc<ExceptionValue> {
        match &self.0.inner {
            Some(inner) if self.0.is_invocation_wrapper() => inner.clone(),
            _ => self.0,
        }
    }
}

/// Compiled evaluator
///
/// Arguments are the receiver first for instance members, followed by the
/// member's arguments in order.
pub trait Callable: Send + Sync {
    /// Run the evaluator
    fn invoke(&self, args: &[Value]) -> std::result::Result<Value, Failure>;
}

impl<F> Callable for F
where
    F: Fn(&[Value]) -> std::result::Result<Value, Failure> + Send + Sync,
{
    fn invoke(&self, args: &[Value]) -> std::result::Result<Value, Failure> {
        self(args)
    }
}

/// Turns member descriptors into callables
pub trait EvaluatorFactory: Send + Sync {
    /// Compile the member into a callable
    fn compile(&self, member: &Member) -> Result<Arc<dyn Callable>>;
}

impl<T: EvaluatorFactory + ?Sized> EvaluatorFactory for Arc<T> {
    fn compile(&self, member: &Member) -> Result<Arc<dyn Callable>> {
        (**self).compile(member)
    }
}

#[cfg(test)]
#[path = "traits_tests.rs"]
mod tests;
