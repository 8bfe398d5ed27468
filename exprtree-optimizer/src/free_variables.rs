//! Free variable analysis
//!
//! A variable is free in a sub-tree when it is referenced there without
//! being bound by a lambda, block or catch clause inside that sub-tree.

use crate::visitor::ExpressionVisitor;
use exprtree_core::ast::{CatchClause, Expr, Variable};
use rustc_hash::FxHashSet;

/// Scope-tracking visitor collecting free variables
#[derive(Debug, Default)]
pub struct FreeVariables {
    scopes: Vec<FxHashSet<Variable>>,
    free: FxHashSet<Variable>,
}

impl FreeVariables {
    /// Free variables of the given sub-trees, scanned as siblings
    pub fn scan<'a>(exprs: impl IntoIterator<Item = &'a Expr>) -> FxHashSet<Variable> {
        let mut scanner = Self::default();
        for expr in exprs {
            scanner.visit(expr);
        }
        scanner.free
    }

    /// Whether `variable` occurs free in any of the sub-trees
    pub fn is_free_in<'a>(variable: &Variable, exprs: impl IntoIterator<Item = &'a Expr>) -> bool {
        Self::scan(exprs).contains(variable)
    }

    fn is_bound(&self, variable: &Variable) -> bool {
        self.scopes.iter().any(|scope| scope.contains(variable))
    }

    fn with_scope<'v>(&mut self, variables: impl IntoIterator<Item = &'v Variable>, f: impl FnOnce(&mut Self)) {
        self.scopes.push(variables.into_iter().cloned().collect());
        f(self);
        self.scopes.pop();
    }
}

impl ExpressionVisitor for FreeVariables {
    fn visit_parameter(&mut self, variable: &Variable) {
        if !self.is_bound(variable) {
            self.free.insert(variable.clone());
        }
    }

    fn visit_lambda(&mut self, params: &[Variable], body: &Expr) {
        self.with_scope(params, |scanner| scanner.visit(body));
    }

    fn visit_block(&mut self, variables: &[Variable], exprs: &[Expr]) {
        self.with_scope(variables, |scanner| {
            for expr in exprs {
                scanner.visit(expr);
            }
        });
    }

    fn visit_catch(&mut self, clause: &CatchClause) {
        self.with_scope(clause.variable(), |scanner| {
            if let Some(filter) = clause.filter() {
                scanner.visit(filter);
            }
            scanner.visit(clause.body());
        });
    }
}
