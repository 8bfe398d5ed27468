//! Structural semantic provider backed by a catalog of library facts

use crate::catalog::SemanticCatalog;
use exprtree_core::ast::{Expr, ExprKind, NewArrayKind};
use exprtree_core::member::{Member, ParameterRef};
use exprtree_core::traits::SemanticProvider;
use exprtree_core::types::{Type, TypeKind};
use exprtree_core::value::Value;

/// Derives facts from the shape of the tree and asks the catalog about
/// library members and types
#[derive(Debug, Clone, Default)]
pub struct DefaultSemanticProvider {
    catalog: SemanticCatalog,
}

impl DefaultSemanticProvider {
    /// Create a provider over `catalog`
    pub fn new(catalog: SemanticCatalog) -> Self {
        Self { catalog }
    }

    /// Library facts
    pub fn catalog(&self) -> &SemanticCatalog {
        &self.catalog
    }

    fn all_pure<'a>(&self, exprs: impl IntoIterator<Item = &'a Expr>) -> bool {
        exprs.into_iter().all(|e| self.is_pure(e))
    }

    fn all_never_throw<'a>(&self, exprs: impl IntoIterator<Item = &'a Expr>) -> bool {
        exprs.into_iter().all(|e| self.never_throws(e))
    }

    /// A receiver that cannot make the dereference fail
    fn safe_receiver(&self, receiver: Option<&Expr>) -> bool {
        receiver.map_or(true, |r| self.is_never_null(r) && self.never_throws(r))
    }
}

impl SemanticProvider for DefaultSemanticProvider {
    fn is_pure(&self, expr: &Expr) -> bool {
        match expr.kind() {
            ExprKind::Constant(_) | ExprKind::Parameter(_) | ExprKind::Default | ExprKind::Lambda { .. } => true,
            ExprKind::Convert { operand } => self.is_pure(operand),
            ExprKind::Call {
                receiver,
                method,
                args,
            } => self.is_pure_member(method) && self.all_pure(receiver.iter().chain(args)),
            ExprKind::MemberAccess { receiver, member } => {
                self.is_pure_member(member) && self.all_pure(receiver)
            }
            ExprKind::New { constructor, args } => {
                let creation = match constructor {
                    Some(constructor) => self.is_pure_member(constructor),
                    None => self.is_pure_type(expr.ty()),
                };
                creation && self.all_pure(args)
            }
            ExprKind::NewArray { items, .. } => self.all_pure(items),
            ExprKind::Index {
                receiver,
                indexer,
                args,
                ..
            } => {
                indexer.as_ref().map_or(true, |m| self.is_pure_member(m))
                    && self.is_pure(receiver)
                    && self.all_pure(args)
            }
            ExprKind::Invoke { callee, args } => match callee.kind() {
                ExprKind::Lambda { body, .. } => self.is_pure(body) && self.all_pure(args),
                _ => false,
            },
            ExprKind::Conditional {
                test,
                if_true,
                if_false,
            } => self.all_pure([test, if_true, if_false]),
            ExprKind::AndAlso { left, right } | ExprKind::OrElse { left, right } => {
                self.all_pure([left, right])
            }
            ExprKind::Switch {
                value,
                comparison,
                cases,
                default,
            } => {
                comparison.as_ref().map_or(true, |m| self.is_pure_member(m))
                    && self.is_pure(value)
                    && cases
                        .iter()
                        .all(|case| self.all_pure(&case.test_values) && self.is_pure(&case.body))
                    && self.all_pure(default)
            }
            ExprKind::TypeTest { operand, .. } => self.is_pure(operand),
            ExprKind::Throw { exception } => self.all_pure(exception),
            ExprKind::Block { exprs, .. } => self.all_pure(exprs),
            ExprKind::Try { .. } | ExprKind::Goto { .. } => false,
        }
    }

    fn is_pure_member(&self, member: &Member) -> bool {
        self.catalog.pure_members.contains(member)
    }

    fn is_pure_type(&self, ty: &Type) -> bool {
        match ty {
            Type::Boolean | Type::Int32 | Type::Int64 | Type::Float64 | Type::Char | Type::Nullable(_) => true,
            Type::Named(named) if named.kind == TypeKind::Enum => true,
            _ => self.catalog.pure_types.contains(ty),
        }
    }

    fn constant_value(&self, expr: &Expr) -> Option<Value> {
        match expr.kind() {
            ExprKind::Constant(value) => Some(value.clone()),
            ExprKind::Default => expr.ty().default_value(),
            _ => None,
        }
    }

    fn is_always_null(&self, expr: &Expr) -> bool {
        match expr.kind() {
            ExprKind::Constant(value) => value.is_null(),
            ExprKind::Default => expr.ty().admits_null(),
            ExprKind::Convert { operand } => expr.ty().admits_null() && self.is_always_null(operand),
            _ => false,
        }
    }

    fn is_never_null(&self, expr: &Expr) -> bool {
        if expr.ty().is_non_nullable_value_type() {
            return true;
        }
        match expr.kind() {
            ExprKind::Constant(value) => !value.is_null(),
            ExprKind::New { .. } | ExprKind::NewArray { .. } | ExprKind::Lambda { .. } => true,
            ExprKind::Convert { operand } => self.is_never_null(operand),
            _ => false,
        }
    }

    fn always_throws(&self, expr: &Expr) -> bool {
        matches!(expr.kind(), ExprKind::Throw { .. })
    }

    fn never_throws(&self, expr: &Expr) -> bool {
        match expr.kind() {
            ExprKind::Constant(_) | ExprKind::Parameter(_) | ExprKind::Default | ExprKind::Lambda { .. } => true,
            ExprKind::Call {
                receiver,
                method,
                args,
            } => {
                self.never_throws_member(method)
                    && self.safe_receiver(receiver.as_ref())
                    && self.all_never_throw(args)
            }
            ExprKind::MemberAccess { receiver, member } => {
                self.never_throws_member(member) && self.safe_receiver(receiver.as_ref())
            }
            ExprKind::New { constructor, args } => {
                constructor.as_ref().map_or(true, |c| self.never_throws_member(c))
                    && self.all_never_throw(args)
            }
            ExprKind::NewArray { kind, items, .. } => {
                *kind == NewArrayKind::Init && self.all_never_throw(items)
            }
            ExprKind::Conditional {
                test,
                if_true,
                if_false,
            } => self.all_never_throw([test, if_true, if_false]),
            ExprKind::AndAlso { left, right } | ExprKind::OrElse { left, right } => {
                self.all_never_throw([left, right])
            }
            ExprKind::TypeTest { operand, .. } => self.never_throws(operand),
            ExprKind::Block { exprs, .. } => self.all_never_throw(exprs),
            _ => false,
        }
    }

    fn never_throws_member(&self, member: &Member) -> bool {
        self.catalog.never_throw_members.contains(member)
    }

    fn is_identity_function(&self, expr: &Expr) -> bool {
        match expr.kind() {
            ExprKind::Lambda { params, body } => match (params.as_slice(), body.kind()) {
                ([param], ExprKind::Parameter(variable)) => param == variable,
                _ => false,
            },
            _ => false,
        }
    }

    fn is_const_parameter(&self, parameter: &ParameterRef) -> bool {
        self.catalog.const_parameters.contains(parameter)
    }

    fn is_immutable_type(&self, ty: &Type) -> bool {
        match ty {
            Type::Void
            | Type::Boolean
            | Type::Int32
            | Type::Int64
            | Type::Float64
            | Type::Char
            | Type::String
            | Type::Function { .. } => true,
            Type::Nullable(inner) => self.is_immutable_type(inner),
            Type::Named(named) if named.kind == TypeKind::Enum => true,
            _ => self.catalog.immutable_types.contains(ty),
        }
    }
}

#[cfg(test)]
#[path = "semantics_tests.rs"]
mod tests;
