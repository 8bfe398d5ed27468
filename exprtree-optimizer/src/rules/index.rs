//! Array element and indexer reads

use crate::analysis::OperandAnalysis;
use crate::evaluation;
use crate::optimizer::{ExpressionOptimizer, VisitContext};
use exprtree_core::ast::{Expr, ExprKind};
use exprtree_core::error::Result;

impl ExpressionOptimizer {
    /// Plain array reads fold whenever the operands are known; indexer
    /// reads follow the call rules
    pub(crate) fn optimize_index(&mut self, node: &Expr, cx: VisitContext) -> Result<Expr> {
        let ExprKind::Index {
            receiver,
            indexer,
            args,
            lvalue,
        } = node.kind()
        else {
            return Ok(node.clone());
        };
        if *lvalue {
            return Ok(node.clone());
        }

        let analysis = OperandAnalysis::analyze(self.semantics.as_ref(), Some(receiver), args);
        if analysis.throws() {
            return self.propagate_throw(node, Some(receiver), args, &analysis);
        }
        if self.dereferences_null(Some(receiver), &analysis) {
            return Ok(self.predict_null_dereference(node));
        }
        if !analysis.all_constant || !self.config.constant_folding {
            return Ok(node.clone());
        }

        match indexer {
            None => {
                let Some((array, indices)) = analysis.values.split_first() else {
                    return Ok(node.clone());
                };
                match evaluation::evaluate_array_index(node, array, indices) {
                    Some(folded) => {
                        self.record_fold(node, &folded);
                        Ok(folded)
                    }
                    None => Ok(node.clone()),
                }
            }
            Some(indexer) if self.semantics.is_pure_member(indexer) && self.fold_permitted(node.ty(), cx) => {
                Ok(self.fold(node, indexer, &analysis.values)?.unwrap_or_else(|| node.clone()))
            }
            Some(_) => Ok(node.clone()),
        }
    }
}
