//! Type-preserving rewrite utilities
//!
//! Rules often replace a node with something of a different static type: a
//! throw taken from an operand, a branch of a conditional, a constant typed
//! by the evaluator. [`change_type`] retypes such a replacement with the
//! smallest change that fits its kind.

use exprtree_core::ast::{Expr, ExprKind};
use exprtree_core::error::{Error, Result};
use exprtree_core::types::Type;

/// Rebuild `expr` so that its static type is `ty`
///
/// Constants, defaults, throws and jumps are retyped in place, conditionals
/// and blocks are retyped through their result positions, and anything else
/// is discarded into a void block or wrapped in a conversion. A coercion
/// with no valid strategy is an [`Error::InvalidTypeCoercion`].
pub fn change_type(expr: &Expr, ty: &Type) -> Result<Expr> {
    if expr.ty() == ty {
        return Ok(expr.clone());
    }

    match expr.kind() {
        ExprKind::Constant(value) if value.is_compatible_with(ty) => {
            Ok(Expr::constant(value.clone(), ty.clone()))
        }
        ExprKind::Default if *ty == Type::Void || expr.ty().default_value() == ty.default_value() => {
            Ok(Expr::default(ty.clone()))
        }
        ExprKind::Throw { exception } => Ok(Expr::throw(exception.clone(), ty.clone())),
        ExprKind::Goto {
            kind,
            target,
            value,
        } => Ok(Expr::goto(*kind, target.clone(), value.clone(), ty.clone())),
        ExprKind::Conditional {
            test,
            if_true,
            if_false,
        } => Ok(Expr::conditional_typed(
            test.clone(),
            change_type(if_true, ty)?,
            change_type(if_false, ty)?,
            ty.clone(),
        )),
        ExprKind::Block { variables, exprs } if !exprs.is_empty() => {
            let mut exprs = exprs.clone();
            if let Some(last) = exprs.last_mut() {
                *last = change_type(last, ty)?;
            }
            Ok(Expr::block_typed(variables.clone(), exprs, ty.clone()))
        }
        _ => convert(expr, ty),
    }
}

/// Fallback coercion for nodes with no kind-specific strategy
fn convert(expr: &Expr, ty: &Type) -> Result<Expr> {
    let from = expr.ty();
    if *ty == Type::Void {
        return Ok(Expr::block_typed(Vec::new(), vec![expr.clone()], Type::Void));
    }
    let lifts = from.unwrap_nullable() == ty.unwrap_nullable();
    if from != &Type::Void && (lifts || ty.is_assignable_from(from) || from.is_assignable_from(ty)) {
        return Ok(Expr::convert(expr.clone(), ty.clone()));
    }
    Err(Error::InvalidTypeCoercion {
        from: from.clone(),
        to: ty.clone(),
    })
}
