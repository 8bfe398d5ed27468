//! Delegate and lambda literal invocations

use crate::analysis::OperandAnalysis;
use crate::coerce::change_type;
use crate::evaluation;
use crate::free_variables::FreeVariables;
use crate::optimizer::{ExpressionOptimizer, VisitContext};
use exprtree_core::ast::{Expr, ExprKind, Variable};
use exprtree_core::error::Result;
use exprtree_core::value::Value;

impl ExpressionOptimizer {
    pub(crate) fn optimize_invoke(&mut self, node: &Expr, cx: VisitContext) -> Result<Expr> {
        let ExprKind::Invoke { callee, args } = node.kind() else {
            return Ok(node.clone());
        };
        if let ExprKind::Lambda { params, body } = callee.kind() {
            return self.optimize_lambda_invocation(node, params, body, args, cx);
        }

        let analysis = OperandAnalysis::analyze(self.semantics.as_ref(), Some(callee), args);
        if analysis.throws() {
            return self.propagate_throw(node, Some(callee), args, &analysis);
        }
        if self.dereferences_null(Some(callee), &analysis) {
            return Ok(self.predict_null_dereference(node));
        }
        if !analysis.all_constant || !self.fold_permitted(node.ty(), cx) {
            return Ok(node.clone());
        }

        let Some((Value::Delegate(delegate), arguments)) = analysis.values.split_first() else {
            return Ok(node.clone());
        };
        let pure = !delegate.targets.is_empty()
            && delegate
                .targets
                .iter()
                .all(|target| self.semantics.is_pure_member(&target.method));
        if !pure {
            return Ok(node.clone());
        }

        match evaluation::evaluate_delegate(node, self.evaluators.as_ref(), delegate, arguments)? {
            Some(folded) => {
                self.record_fold(node, &folded);
                Ok(folded)
            }
            None => {
                self.stats.evaluator_refusals += 1;
                Ok(node.clone())
            }
        }
    }

    /// `((x) => body)(args)` with the lambda written in place
    fn optimize_lambda_invocation(
        &mut self,
        node: &Expr,
        params: &[Variable],
        body: &Expr,
        args: &[Expr],
        cx: VisitContext,
    ) -> Result<Expr> {
        let analysis = OperandAnalysis::analyze(self.semantics.as_ref(), None, args);
        if analysis.throws() {
            return self.propagate_throw(node, None, args, &analysis);
        }
        if !analysis.all_constant {
            return Ok(node.clone());
        }

        if self.semantics.always_throws(body) {
            let free = FreeVariables::scan([body]);
            if params.iter().all(|param| !free.contains(param)) {
                let result = change_type(body, node.ty())?;
                self.stats.throws_propagated += 1;
                self.log_rewrite("throwing lambda body", node, &result);
                return Ok(result);
            }
        }

        if !self.config.beta_reduction {
            return Ok(node.clone());
        }
        let Some(reduced) = self.reducer.reduce(self.semantics.as_ref(), params, body, args) else {
            return Ok(node.clone());
        };
        let reduced = change_type(&reduced, node.ty())?;
        self.stats.beta_reductions += 1;
        self.log_rewrite("beta reduction", node, &reduced);

        // Substituted constants usually enable folds in the inlined body
        self.visit(&reduced, cx)
    }
}
