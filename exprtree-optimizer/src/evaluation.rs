//! Constant evaluation engine
//!
//! Runs compiled callables over known operand values at optimization time.
//! A normal result becomes a constant node, an exception becomes a throw
//! node of the same static type, so a failing fold behaves exactly like the
//! failing runtime evaluation it replaces.

use exprtree_core::ast::Expr;
use exprtree_core::error::{Error, Result};
use exprtree_core::member::Member;
use exprtree_core::traits::{Callable, EvaluatorFactory, Failure};
use exprtree_core::types::Type;
use exprtree_core::value::{ArrayValue, DelegateValue, ObjectValue, Value};
use std::sync::Arc;
use tracing::debug;

/// Invoke `callable` with `operands` and turn the outcome into a node
/// replacing `node`
///
/// Operands are the receiver value first, when there is one, then the
/// arguments in order.
pub fn evaluate(node: &Expr, callable: &dyn Callable, operands: &[Value]) -> Result<Expr> {
    match callable.invoke(operands) {
        Ok(value) => constant_of(node, value),
        Err(failure) => Ok(throw_of(node, failure)),
    }
}

/// Constant replacing `node`, checked against its static type
pub fn constant_of(node: &Expr, value: Value) -> Result<Expr> {
    let ty = node.ty();
    if *ty == Type::Void {
        return Ok(Expr::default(Type::Void));
    }
    if !value.is_compatible_with(ty) {
        return Err(Error::InvalidResult {
            member: node.to_string(),
            expected: ty.clone(),
        });
    }
    Ok(Expr::constant(value, ty.clone()))
}

/// Throw of the exception the callee raised, typed as `node`
pub fn throw_of(node: &Expr, failure: Failure) -> Expr {
    Expr::throw_value(Value::Exception(failure.unwrap_invocation()), node.ty().clone())
}

/// Throw of a new exception of type `exception`, typed as `node`
pub fn throw_new(node: &Expr, exception: Type, message: &str) -> Expr {
    Expr::throw_value(Value::exception(exception, message), node.ty().clone())
}

/// Compile `member`, treating a factory error as a refusal
pub fn compile(factory: &dyn EvaluatorFactory, member: &Member) -> Option<Arc<dyn Callable>> {
    match factory.compile(member) {
        Ok(callable) => Some(callable),
        Err(err) => {
            debug!(member = %member, error = %err, "evaluator unavailable, fold refused");
            None
        }
    }
}

/// Build a one dimensional array from its element values
///
/// Returns `None` when the array is longer than `max_length`.
pub fn evaluate_array_init(node: &Expr, element: &Type, items: Vec<Value>, max_length: usize) -> Option<Expr> {
    if items.len() > max_length {
        return None;
    }
    let array = ArrayValue::vector(element.clone(), items);
    Some(Expr::constant(Value::Array(Arc::new(array)), node.ty().clone()))
}

/// Build an array of default elements from one size per dimension
///
/// A negative size yields a throw of `OverflowException`. Returns `None`
/// when a size is not an integer, the element type has no known default,
/// or the array would hold more than `max_length` elements.
pub fn evaluate_array_bounds(node: &Expr, element: &Type, bounds: &[Value], max_length: usize) -> Option<Expr> {
    let mut lengths = Vec::with_capacity(bounds.len());
    for bound in bounds {
        let bound = bound.as_i64()?;
        if bound < 0 {
            return Some(throw_new(
                node,
                Type::overflow_exception(),
                "Arithmetic operation resulted in an overflow.",
            ));
        }
        lengths.push(usize::try_from(bound).ok()?);
    }

    let total = lengths
        .iter()
        .try_fold(1usize, |acc, &length| acc.checked_mul(length))
        .filter(|&total| total <= max_length)?;
    let default = if total == 0 {
        Value::Null
    } else {
        element_default(element)?
    };

    let array = ArrayValue {
        element: element.clone(),
        lengths,
        items: vec![default; total],
    };
    Some(Expr::constant(Value::Array(Arc::new(array)), node.ty().clone()))
}

/// Read an array element
///
/// A null array yields a throw of `NullReferenceException` and an index
/// outside the bounds a throw of `IndexOutOfRangeException`. Returns `None`
/// when the operands are not an array and integer indices of its rank.
pub fn evaluate_array_index(node: &Expr, array: &Value, indices: &[Value]) -> Option<Expr> {
    let array = match array {
        Value::Array(array) => array,
        Value::Null => {
            return Some(throw_new(
                node,
                Type::null_reference_exception(),
                "Object reference not set to an instance of an object.",
            ))
        }
        _ => return None,
    };
    if indices.len() != array.lengths.len() {
        return None;
    }
    let indices = indices.iter().map(Value::as_i64).collect::<Option<Vec<_>>>()?;

    match array.get(&indices) {
        Some(value) => Some(Expr::constant(value.clone(), node.ty().clone())),
        None => Some(throw_new(
            node,
            Type::index_out_of_range_exception(),
            "Index was outside the bounds of the array.",
        )),
    }
}

/// Invoke every target of a possibly multicast delegate, in order
///
/// The last target's result is the value of the invocation. The first
/// failing target ends the invocation with its exception. Returns
/// `Ok(None)` when a target cannot be compiled.
pub fn evaluate_delegate(
    node: &Expr,
    factory: &dyn EvaluatorFactory,
    delegate: &DelegateValue,
    args: &[Value],
) -> Result<Option<Expr>> {
    let mut result = None;
    for target in &delegate.targets {
        let callable = match compile(factory, &target.method) {
            Some(callable) => callable,
            None => return Ok(None),
        };
        let operands: Vec<Value> = target.receiver.iter().chain(args).cloned().collect();
        match callable.invoke(&operands) {
            Ok(value) => result = Some(value),
            Err(failure) => return Ok(Some(throw_of(node, failure))),
        }
    }
    result.map(|value| constant_of(node, value)).transpose()
}

/// Default instance of a value type built without a constructor
pub fn evaluate_value_type_default(node: &Expr) -> Option<Expr> {
    let value = element_default(node.ty())?;
    Some(Expr::constant(value, node.ty().clone()))
}

fn element_default(ty: &Type) -> Option<Value> {
    match ty {
        Type::Named(named) if ty.is_non_nullable_value_type() => {
            Some(Value::Object(Arc::new(ObjectValue {
                ty: Type::Named(named.clone()),
                fields: Vec::new(),
            })))
        }
        _ => ty.default_value(),
    }
}

#[cfg(test)]
#[path = "evaluation_tests.rs"]
mod tests;
