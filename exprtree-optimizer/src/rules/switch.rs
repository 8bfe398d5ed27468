//! Switches over constant values

use crate::coerce::change_type;
use crate::evaluation;
use crate::optimizer::ExpressionOptimizer;
use exprtree_core::ast::{Expr, ExprKind};
use exprtree_core::error::Result;

impl ExpressionOptimizer {
    /// Cases are scanned in order and each test value must be known, which
    /// makes the result the same whether the switch lowers to a jump table
    /// or to a chain of comparisons
    pub(crate) fn optimize_switch(&mut self, node: &Expr) -> Result<Expr> {
        let ExprKind::Switch {
            value,
            comparison,
            cases,
            default,
        } = node.kind()
        else {
            return Ok(node.clone());
        };

        if self.semantics.always_throws(value) {
            let result = change_type(value, node.ty())?;
            self.stats.throws_propagated += 1;
            self.log_rewrite("throw propagation", node, &result);
            return Ok(result);
        }
        if !self.config.constant_folding {
            return Ok(node.clone());
        }
        let Some(switched) = self.semantics.constant_value(value) else {
            return Ok(node.clone());
        };

        let equality = match comparison {
            None => None,
            Some(method) => {
                if !self.semantics.is_pure_member(method) {
                    return Ok(node.clone());
                }
                match evaluation::compile(self.evaluators.as_ref(), method) {
                    Some(callable) => Some(callable),
                    None => {
                        self.stats.evaluator_refusals += 1;
                        return Ok(node.clone());
                    }
                }
            }
        };

        for case in cases {
            for test in &case.test_values {
                if self.semantics.always_throws(test) {
                    let result = change_type(test, node.ty())?;
                    self.stats.throws_propagated += 1;
                    self.log_rewrite("throw propagation", node, &result);
                    return Ok(result);
                }
                let Some(candidate) = self.semantics.constant_value(test) else {
                    return Ok(node.clone());
                };

                let matched = match &equality {
                    None => switched.default_equals(&candidate),
                    Some(callable) => match callable.invoke(&[switched.clone(), candidate]) {
                        Ok(result) => match result.as_bool() {
                            Some(matched) => matched,
                            None => return Ok(node.clone()),
                        },
                        Err(failure) => {
                            let thrown = evaluation::throw_of(node, failure);
                            self.record_fold(node, &thrown);
                            return Ok(thrown);
                        }
                    },
                };
                if matched {
                    return self.select_branch(node, &case.body);
                }
            }
        }

        match default {
            Some(default) => self.select_branch(node, default),
            None => {
                let result = Expr::default(node.ty().clone());
                self.stats.branches_eliminated += 1;
                self.log_rewrite("branch elimination", node, &result);
                Ok(result)
            }
        }
    }
}
