//! Conditionals

use crate::coerce::change_type;
use crate::optimizer::ExpressionOptimizer;
use exprtree_core::ast::{Expr, ExprKind};
use exprtree_core::error::Result;

impl ExpressionOptimizer {
    pub(crate) fn optimize_conditional(&mut self, node: &Expr) -> Result<Expr> {
        let ExprKind::Conditional {
            test,
            if_true,
            if_false,
        } = node.kind()
        else {
            return Ok(node.clone());
        };

        if self.semantics.always_throws(test) {
            let result = change_type(test, node.ty())?;
            self.stats.throws_propagated += 1;
            self.log_rewrite("throw propagation", node, &result);
            return Ok(result);
        }
        if let Some(taken) = self.semantics.constant_value(test).and_then(|v| v.as_bool()) {
            let branch = if taken { if_true } else { if_false };
            return self.select_branch(node, branch);
        }

        if self.config.conditional_flattening {
            if let Some(flattened) = self.flatten_conditional(node, test, if_true, if_false) {
                self.stats.branches_eliminated += 1;
                self.log_rewrite("conditional flattening", node, &flattened);
                return Ok(flattened);
            }
        }
        Ok(node.clone())
    }

    /// `c1 ? (c2 ? t : d) : d` into `(c1 && c2) ? t : d` when `d` is a
    /// default or constant
    fn flatten_conditional(&self, node: &Expr, test: &Expr, if_true: &Expr, if_false: &Expr) -> Option<Expr> {
        let ExprKind::Conditional {
            test: inner_test,
            if_true: inner_true,
            if_false: inner_false,
        } = if_true.kind()
        else {
            return None;
        };
        if !matches!(if_false.kind(), ExprKind::Default | ExprKind::Constant(_)) {
            return None;
        }
        if if_true.ty() != node.ty() || inner_false != if_false {
            return None;
        }

        Some(Expr::conditional_typed(
            Expr::and_also(test.clone(), inner_test.clone()),
            inner_true.clone(),
            if_false.clone(),
            node.ty().clone(),
        ))
    }
}
