//! Short-circuiting `&&` and `||`

use crate::coerce::change_type;
use crate::optimizer::ExpressionOptimizer;
use exprtree_core::ast::{Expr, ExprKind};
use exprtree_core::error::Result;

impl ExpressionOptimizer {
    pub(crate) fn optimize_logical(&mut self, node: &Expr) -> Result<Expr> {
        let (left, right, conjunction) = match node.kind() {
            ExprKind::AndAlso { left, right } => (left, right, true),
            ExprKind::OrElse { left, right } => (left, right, false),
            _ => return Ok(node.clone()),
        };

        if self.semantics.always_throws(left) {
            let result = change_type(left, node.ty())?;
            self.stats.throws_propagated += 1;
            self.log_rewrite("throw propagation", node, &result);
            return Ok(result);
        }

        match self.semantics.constant_value(left).and_then(|v| v.as_bool()) {
            // true && r, false || r
            Some(value) if value == conjunction => self.select_branch(node, right),
            // false && r, true || r
            Some(_) => self.select_branch(node, left),
            None => Ok(node.clone()),
        }
    }
}
