//! Object construction

use crate::analysis::OperandAnalysis;
use crate::evaluation;
use crate::optimizer::{ExpressionOptimizer, VisitContext};
use exprtree_core::ast::{Expr, ExprKind};
use exprtree_core::error::Result;

impl ExpressionOptimizer {
    pub(crate) fn optimize_new(&mut self, node: &Expr, cx: VisitContext) -> Result<Expr> {
        let ExprKind::New { constructor, args } = node.kind() else {
            return Ok(node.clone());
        };

        let analysis = OperandAnalysis::analyze(self.semantics.as_ref(), None, args);
        if analysis.throws() {
            return self.propagate_throw(node, None, args, &analysis);
        }
        // A folded value type is boxed into the constant, so even
        // constructor-less creation must be allowed to share its result
        if !analysis.all_constant || !self.fold_permitted(node.ty(), cx) {
            return Ok(node.clone());
        }

        match constructor {
            Some(constructor) if self.semantics.is_pure_member(constructor) => {
                Ok(self.fold(node, constructor, &analysis.values)?.unwrap_or_else(|| node.clone()))
            }
            None if self.semantics.is_pure_type(node.ty()) => {
                match evaluation::evaluate_value_type_default(node) {
                    Some(folded) => {
                        self.record_fold(node, &folded);
                        Ok(folded)
                    }
                    None => Ok(node.clone()),
                }
            }
            _ => Ok(node.clone()),
        }
    }
}
