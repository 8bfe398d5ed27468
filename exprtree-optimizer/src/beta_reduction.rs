//! Beta reduction of lambda literal invocations
//!
//! `((x, y) => body)(a, b)` becomes `body` with every free occurrence of `x`
//! and `y` replaced by `a` and `b`. Only constant arguments are substituted,
//! so duplicating or dropping an argument cannot duplicate or drop work.

use crate::coerce::change_type;
use exprtree_core::ast::{CatchClause, Expr, ExprKind, Variable};
use exprtree_core::traits::SemanticProvider;
use rustc_hash::{FxHashMap, FxHashSet};

/// Inlines the body of an invoked lambda literal
#[derive(Debug, Clone, Copy, Default)]
pub struct BetaReducer;

impl BetaReducer {
    /// Create new reducer
    pub fn new() -> Self {
        Self
    }

    /// Substitute `args` for `params` in `body`
    ///
    /// Returns `None` when the reduction cannot be done safely: the arity
    /// differs, a parameter is listed twice, an argument has no known value
    /// or cannot take the parameter's type.
    pub fn reduce(
        &self,
        semantics: &dyn SemanticProvider,
        params: &[Variable],
        body: &Expr,
        args: &[Expr],
    ) -> Option<Expr> {
        if params.len() != args.len() {
            return None;
        }
        let distinct: FxHashSet<&Variable> = params.iter().collect();
        if distinct.len() != params.len() {
            return None;
        }

        let mut substitutions = FxHashMap::default();
        for (param, arg) in params.iter().zip(args) {
            let value = semantics.constant_value(arg)?;
            let literal = change_type(&Expr::constant(value, arg.ty().clone()), param.ty()).ok()?;
            substitutions.insert(param.clone(), literal);
        }

        Some(self.copy_with_substitution(body, &substitutions))
    }

    /// Copy `expr` with variable substitution, sharing untouched sub-trees
    fn copy_with_substitution(&self, expr: &Expr, substitutions: &FxHashMap<Variable, Expr>) -> Expr {
        if substitutions.is_empty() {
            return expr.clone();
        }

        match expr.kind() {
            ExprKind::Parameter(variable) => substitutions
                .get(variable)
                .cloned()
                .unwrap_or_else(|| expr.clone()),
            // Inner bindings of a substituted variable shadow it
            ExprKind::Lambda { params, .. } => {
                let inner = Self::unshadowed(substitutions, params);
                expr.map_children(|child| self.copy_with_substitution(child, &inner))
            }
            ExprKind::Block { variables, .. } => {
                let inner = Self::unshadowed(substitutions, variables);
                expr.map_children(|child| self.copy_with_substitution(child, &inner))
            }
            ExprKind::Try {
                body,
                handlers,
                finally,
                fault,
            } => {
                let copy = |e: &Expr| self.copy_with_substitution(e, substitutions);
                let new_body = copy(body);
                let new_handlers: Vec<CatchClause> = handlers
                    .iter()
                    .map(|handler| {
                        let bound = handler.variable().map(std::slice::from_ref).unwrap_or(&[]);
                        let inner = Self::unshadowed(substitutions, bound);
                        handler.with_parts(
                            handler.filter().map(|f| self.copy_with_substitution(f, &inner)),
                            self.copy_with_substitution(handler.body(), &inner),
                        )
                    })
                    .collect();
                let new_finally = finally.as_ref().map(copy);
                let new_fault = fault.as_ref().map(copy);

                let unchanged = Expr::ptr_eq(&new_body, body)
                    && new_handlers
                        .iter()
                        .zip(handlers)
                        .all(|(new, old)| CatchClause::ptr_eq(new, old))
                    && same(new_finally.as_ref(), finally.as_ref())
                    && same(new_fault.as_ref(), fault.as_ref());
                if unchanged {
                    return expr.clone();
                }
                Expr::new(
                    ExprKind::Try {
                        body: new_body,
                        handlers: new_handlers,
                        finally: new_finally,
                        fault: new_fault,
                    },
                    expr.ty().clone(),
                )
            }
            _ => expr.map_children(|child| self.copy_with_substitution(child, substitutions)),
        }
    }

    /// Substitutions minus the variables `bound` re-binds
    fn unshadowed(substitutions: &FxHashMap<Variable, Expr>, bound: &[Variable]) -> FxHashMap<Variable, Expr> {
        if bound.iter().any(|v| substitutions.contains_key(v)) {
            substitutions
                .iter()
                .filter(|(variable, _)| !bound.contains(variable))
                .map(|(variable, expr)| (variable.clone(), expr.clone()))
                .collect()
        } else {
            substitutions.clone()
        }
    }
}

fn same(a: Option<&Expr>, b: Option<&Expr>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => Expr::ptr_eq(a, b),
        _ => false,
    }
}
