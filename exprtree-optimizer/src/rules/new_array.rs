//! Array construction

use crate::analysis::OperandAnalysis;
use crate::evaluation;
use crate::optimizer::{ExpressionOptimizer, VisitContext};
use exprtree_core::ast::{Expr, ExprKind, NewArrayKind};
use exprtree_core::error::Result;

impl ExpressionOptimizer {
    pub(crate) fn optimize_new_array(&mut self, node: &Expr, cx: VisitContext) -> Result<Expr> {
        let ExprKind::NewArray {
            element,
            kind,
            items,
        } = node.kind()
        else {
            return Ok(node.clone());
        };

        let analysis = OperandAnalysis::analyze(self.semantics.as_ref(), None, items);
        if analysis.throws() {
            return self.propagate_throw(node, None, items, &analysis);
        }
        if !analysis.all_constant || !self.fold_permitted(node.ty(), cx) {
            return Ok(node.clone());
        }

        let max_length = self.config.max_folded_array_length;
        let folded = match kind {
            NewArrayKind::Init => evaluation::evaluate_array_init(node, element, analysis.values, max_length),
            NewArrayKind::Bounds => evaluation::evaluate_array_bounds(node, element, &analysis.values, max_length),
        };
        match folded {
            Some(folded) => {
                self.record_fold(node, &folded);
                Ok(folded)
            }
            None => Ok(node.clone()),
        }
    }
}
