//! Conversions

use crate::coerce::change_type;
use crate::optimizer::ExpressionOptimizer;
use exprtree_core::ast::{Expr, ExprKind};
use exprtree_core::error::Result;

impl ExpressionOptimizer {
    /// Only representation-preserving conversions of constants fold
    pub(crate) fn optimize_convert(&mut self, node: &Expr) -> Result<Expr> {
        let ExprKind::Convert { operand } = node.kind() else {
            return Ok(node.clone());
        };

        if self.semantics.always_throws(operand) {
            let result = change_type(operand, node.ty())?;
            self.stats.throws_propagated += 1;
            self.log_rewrite("throw propagation", node, &result);
            return Ok(result);
        }

        if self.config.constant_folding {
            if let Some(value) = self.semantics.constant_value(operand) {
                if value.is_compatible_with(node.ty()) {
                    let folded = Expr::constant(value, node.ty().clone());
                    self.record_fold(node, &folded);
                    return Ok(folded);
                }
            }
        }
        Ok(node.clone())
    }
}
