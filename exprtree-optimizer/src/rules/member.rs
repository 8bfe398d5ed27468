//! Property and field reads

use crate::analysis::OperandAnalysis;
use crate::optimizer::{ExpressionOptimizer, VisitContext};
use exprtree_core::ast::{Expr, ExprKind};
use exprtree_core::error::Result;

impl ExpressionOptimizer {
    /// Static members have no operands, so a pure one always folds when
    /// permitted
    pub(crate) fn optimize_member_access(&mut self, node: &Expr, cx: VisitContext) -> Result<Expr> {
        let ExprKind::MemberAccess { receiver, member } = node.kind() else {
            return Ok(node.clone());
        };

        let analysis = OperandAnalysis::analyze(self.semantics.as_ref(), receiver.as_ref(), &[]);
        if analysis.throws() {
            return self.propagate_throw(node, receiver.as_ref(), &[], &analysis);
        }
        if self.dereferences_null(receiver.as_ref(), &analysis) {
            return Ok(self.predict_null_dereference(node));
        }

        if analysis.all_constant
            && self.semantics.is_pure_member(member)
            && self.fold_permitted(node.ty(), cx)
        {
            if let Some(folded) = self.fold(node, member, &analysis.values)? {
                return Ok(folded);
            }
        }
        Ok(node.clone())
    }
}
