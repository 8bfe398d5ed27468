//! Method calls

use crate::analysis::OperandAnalysis;
use crate::optimizer::{ExpressionOptimizer, VisitContext};
use exprtree_core::ast::{Expr, ExprKind};
use exprtree_core::error::Result;

impl ExpressionOptimizer {
    pub(crate) fn optimize_call(&mut self, node: &Expr, cx: VisitContext) -> Result<Expr> {
        let ExprKind::Call {
            receiver,
            method,
            args,
        } = node.kind()
        else {
            return Ok(node.clone());
        };

        let analysis = OperandAnalysis::analyze(self.semantics.as_ref(), receiver.as_ref(), args);
        if analysis.throws() {
            return self.propagate_throw(node, receiver.as_ref(), args, &analysis);
        }
        if self.dereferences_null(receiver.as_ref(), &analysis) {
            return Ok(self.predict_null_dereference(node));
        }

        if analysis.all_constant
            && self.semantics.is_pure_member(method)
            && self.fold_permitted(node.ty(), cx)
        {
            if let Some(folded) = self.fold(node, method, &analysis.values)? {
                return Ok(folded);
            }
        }
        Ok(node.clone())
    }
}
