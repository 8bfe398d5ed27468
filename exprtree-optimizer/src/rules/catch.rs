//! Try blocks and their catch clauses

use crate::coerce::change_type;
use crate::free_variables::FreeVariables;
use crate::optimizer::ExpressionOptimizer;
use exprtree_core::ast::{CatchClause, Expr, ExprKind};
use exprtree_core::error::Result;
use tracing::trace;

impl ExpressionOptimizer {
    pub(crate) fn optimize_try(&mut self, node: &Expr) -> Result<Expr> {
        let ExprKind::Try {
            body,
            handlers,
            finally,
            fault,
        } = node.kind()
        else {
            return Ok(node.clone());
        };

        let mut changed = false;
        let mut kept = Vec::with_capacity(handlers.len());
        for handler in handlers {
            let clause = self.optimize_catch(handler);
            changed |= !CatchClause::ptr_eq(&clause, handler);

            // A clause whose filter is always false never handles anything
            let dead = self.config.try_simplification
                && clause.filter().map_or(false, |filter| self.semantics.is_false(filter));
            if dead {
                trace!(rule = "dead catch clause", test = %clause.test(), "rewrite");
                self.stats.filters_removed += 1;
                changed = true;
                continue;
            }
            kept.push(clause);
        }

        if self.config.try_simplification && finally.is_none() {
            let trivial = kept.is_empty() && fault.is_none();
            if trivial || self.semantics.never_throws(body) {
                let result = change_type(body, node.ty())?;
                self.stats.branches_eliminated += 1;
                self.log_rewrite("try elimination", node, &result);
                return Ok(result);
            }
        }

        if !changed {
            return Ok(node.clone());
        }
        Ok(Expr::new(
            ExprKind::Try {
                body: body.clone(),
                handlers: kept,
                finally: finally.clone(),
                fault: fault.clone(),
            },
            node.ty().clone(),
        ))
    }

    /// Drop an unused exception binding and an always-true filter
    ///
    /// Always-false filters are left to [`Self::optimize_try`], which can
    /// remove the whole clause.
    pub(crate) fn optimize_catch(&mut self, clause: &CatchClause) -> CatchClause {
        let mut result = clause.clone();

        let unused = clause.variable().map_or(false, |variable| {
            let scanned = clause.filter().into_iter().chain(std::iter::once(clause.body()));
            !FreeVariables::is_free_in(variable, scanned)
        });
        if unused {
            trace!(rule = "unused catch binding", test = %clause.test(), "rewrite");
            result = result.with_variable(None);
            self.stats.catch_bindings_dropped += 1;
        }

        if result.filter().map_or(false, |filter| self.semantics.is_true(filter)) {
            trace!(rule = "constant catch filter", test = %clause.test(), "rewrite");
            result = result.with_parts(None, result.body().clone());
            self.stats.filters_removed += 1;
        }
        result
    }
}
