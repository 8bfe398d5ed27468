//! Shared fixtures: a small library of members with their semantic facts
//! and evaluators

#![allow(dead_code)]

use exprtree_core::ast::Expr;
use exprtree_core::member::Member;
use exprtree_core::traits::{Callable, EvaluatorFactory, Failure};
use exprtree_core::types::{NamedType, Type, TypeKind};
use exprtree_core::value::{ArrayValue, Value};
use exprtree_core::Result;
use exprtree_optimizer::{DefaultSemanticProvider, ExpressionOptimizer, FunctionRegistry, SemanticCatalog};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub fn add() -> Member {
    Member::static_method(
        Type::Int32,
        "Add",
        vec![("a", Type::Int32), ("b", Type::Int32)],
        Type::Int32,
    )
}

pub fn concat() -> Member {
    Member::static_method(
        Type::String,
        "Concat",
        vec![("a", Type::String), ("b", Type::String)],
        Type::String,
    )
}

/// Has a side effect, never in the pure table
pub fn log() -> Member {
    Member::static_method(Type::Object, "Log", vec![("x", Type::Int32)], Type::Int32)
}

/// Pure, returns a new mutable array
pub fn range() -> Member {
    Member::static_method(
        Type::Object,
        "Range",
        vec![("count", Type::Int32)],
        Type::array(Type::Int32),
    )
}

/// Pure, reads its array argument without keeping it
pub fn count() -> Member {
    Member::static_method(
        Type::Object,
        "Count",
        vec![("items", Type::array(Type::Int32))],
        Type::Int32,
    )
}

pub fn length() -> Member {
    Member::property(Type::String, "Length", Type::Int32, false)
}

pub fn pair_type() -> Type {
    NamedType::new("Pair", TypeKind::Struct).build()
}

/// Neither pure nor registered
pub fn pair_constructor() -> Member {
    Member::constructor(pair_type(), vec![("first", Type::Int32), ("second", Type::Int32)])
}

pub fn sealed_ref_type() -> Type {
    NamedType::new("Sealed", TypeKind::Class).sealed().build()
}

pub fn catalog() -> SemanticCatalog {
    let mut catalog = SemanticCatalog::new()
        .with_pure_member(add())
        .with_pure_member(concat())
        .with_pure_member(range())
        .with_pure_member(count())
        .with_pure_member(length())
        .with_never_throw_member(concat());
    if let Some(items) = count().parameter(0) {
        catalog = catalog.with_const_parameter(items);
    }
    catalog
}

pub fn registry() -> FunctionRegistry {
    FunctionRegistry::new()
        .with(add(), |args| match args {
            [Value::Int32(a), Value::Int32(b)] => a
                .checked_add(*b)
                .map(Value::Int32)
                .ok_or_else(|| Failure::new(Type::overflow_exception(), "overflow").wrapped()),
            _ => Err(Failure::new(Type::invalid_cast_exception(), "bad operands")),
        })
        .with(concat(), |args| match args {
            [Value::String(a), Value::String(b)] => Ok(Value::string(format!("{a}{b}"))),
            _ => Err(Failure::new(Type::null_reference_exception(), "null operand")),
        })
        .with(range(), |args| {
            let count = args.first().and_then(Value::as_i64).unwrap_or(0);
            let items = (0..count).map(|i| Value::Int32(i as i32)).collect();
            Ok(Value::Array(Arc::new(ArrayValue::vector(Type::Int32, items))))
        })
        .with(count(), |args| match args {
            [Value::Array(array)] => Ok(Value::Int32(array.items.len() as i32)),
            _ => Err(Failure::new(Type::null_reference_exception(), "null array")),
        })
        .with(length(), |args| match args {
            [Value::String(s)] => Ok(Value::Int32(s.chars().count() as i32)),
            _ => Err(Failure::new(Type::null_reference_exception(), "null string")),
        })
}

/// Factory that counts compile requests
#[derive(Default)]
pub struct CountingFactory {
    pub inner: FunctionRegistry,
    pub compiles: AtomicUsize,
}

impl CountingFactory {
    pub fn new(inner: FunctionRegistry) -> Self {
        Self {
            inner,
            compiles: AtomicUsize::new(0),
        }
    }

    pub fn compiles(&self) -> usize {
        self.compiles.load(Ordering::SeqCst)
    }
}

impl EvaluatorFactory for CountingFactory {
    fn compile(&self, member: &Member) -> Result<Arc<dyn Callable>> {
        self.compiles.fetch_add(1, Ordering::SeqCst);
        self.inner.compile(member)
    }
}

pub fn optimizer() -> ExpressionOptimizer {
    ExpressionOptimizer::new(
        Arc::new(DefaultSemanticProvider::new(catalog())),
        Arc::new(registry()),
    )
}

pub fn call(member: Member, args: Vec<Expr>) -> Expr {
    Expr::call(None, member, args)
}

pub fn throw(message: &str, ty: Type) -> Expr {
    Expr::throw_value(Value::exception(Type::exception(), message), ty)
}

/// Type of the exception thrown by a throw node
pub fn thrown_type(expr: &Expr) -> Option<Type> {
    match expr.kind() {
        exprtree_core::ExprKind::Throw {
            exception: Some(exception),
        } => Some(exception.ty().clone()),
        _ => None,
    }
}
