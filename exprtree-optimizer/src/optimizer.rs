//! Traversal driver
//!
//! One children-first pass over the tree. Each node's children are visited
//! before the rule for its kind runs, so rules always see optimized
//! operands. Rules may call back into [`ExpressionOptimizer::visit`] on the
//! trees they build, which is how beta reduction exposes further folds.

use crate::analysis::OperandAnalysis;
use crate::beta_reduction::BetaReducer;
use crate::coerce::change_type;
use crate::config::{OptimizationConfig, OptimizationLevel};
use crate::evaluation;
use crate::hooks::{DefaultHooks, OptimizerHooks};
use crate::stats::OptimizationStats;
use exprtree_core::ast::{Expr, ExprKind};
use exprtree_core::error::Result;
use exprtree_core::member::Member;
use exprtree_core::traits::{EvaluatorFactory, SemanticProvider};
use exprtree_core::types::Type;
use exprtree_core::value::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, trace};

/// State threaded top-down through the traversal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisitContext {
    /// The current position feeds a parameter its member only reads
    pub const_context: bool,
}

impl VisitContext {
    /// Context of an argument position
    pub fn argument(const_context: bool) -> Self {
        Self { const_context }
    }
}

/// Rewrites expression trees into smaller equivalent ones
pub struct ExpressionOptimizer {
    pub(crate) semantics: Arc<dyn SemanticProvider>,
    pub(crate) evaluators: Arc<dyn EvaluatorFactory>,
    pub(crate) hooks: Arc<dyn OptimizerHooks>,
    pub(crate) config: OptimizationConfig,
    pub(crate) stats: OptimizationStats,
    pub(crate) reducer: BetaReducer,
}

impl ExpressionOptimizer {
    /// Create an optimizer with default hooks and configuration
    pub fn new(semantics: Arc<dyn SemanticProvider>, evaluators: Arc<dyn EvaluatorFactory>) -> Self {
        Self {
            semantics,
            evaluators,
            hooks: Arc::new(DefaultHooks),
            config: OptimizationConfig::default(),
            stats: OptimizationStats::new(),
            reducer: BetaReducer::new(),
        }
    }

    /// Replace the extension hooks
    pub fn with_hooks(mut self, hooks: Arc<dyn OptimizerHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: OptimizationConfig) -> Self {
        self.config = config;
        self
    }

    /// Active configuration
    pub fn config(&self) -> &OptimizationConfig {
        &self.config
    }

    /// Statistics of the last run
    pub fn stats(&self) -> &OptimizationStats {
        &self.stats
    }

    /// Semantic facts in use
    pub fn semantics(&self) -> &dyn SemanticProvider {
        self.semantics.as_ref()
    }

    /// Optimize a whole tree
    pub fn optimize(&mut self, expr: &Expr) -> Result<Expr> {
        let start = Instant::now();
        self.stats = OptimizationStats::new();
        self.stats.nodes_before = expr.node_count();

        let optimized = match self.config.level {
            OptimizationLevel::None => expr.clone(),
            _ => self.visit(expr, VisitContext::default())?,
        };

        self.stats.nodes_after = optimized.node_count();
        self.stats.optimization_time_us = start.elapsed().as_micros() as u64;
        debug!(
            level = ?self.config.level,
            nodes_before = self.stats.nodes_before,
            nodes_after = self.stats.nodes_after,
            rewrites = self.stats.total_optimizations(),
            "optimization finished"
        );
        Ok(optimized)
    }

    /// Optimize one node in `cx`, children first
    pub fn visit(&mut self, expr: &Expr, cx: VisitContext) -> Result<Expr> {
        if !self.hooks.should_optimize(expr) {
            return Ok(expr.clone());
        }

        let pre = self.hooks.pre_optimize(expr.clone());
        let result = self.dispatch(&pre, cx)?;
        debug_assert_eq!(
            result.ty(),
            expr.ty(),
            "rewrite of {} changed its static type",
            expr
        );

        if Expr::ptr_eq(&result, expr) {
            return Ok(result);
        }
        Ok(self.hooks.post_optimize(result))
    }

    fn dispatch(&mut self, expr: &Expr, cx: VisitContext) -> Result<Expr> {
        let contexts = self.child_contexts(expr);
        let mut index = 0;
        let node = expr.try_map_children(|child| {
            let child_cx = contexts.get(index).copied().unwrap_or(cx);
            index += 1;
            self.visit(child, child_cx)
        })?;

        match node.kind() {
            ExprKind::Call { .. } => self.optimize_call(&node, cx),
            ExprKind::MemberAccess { .. } => self.optimize_member_access(&node, cx),
            ExprKind::New { .. } => self.optimize_new(&node, cx),
            ExprKind::NewArray { .. } => self.optimize_new_array(&node, cx),
            ExprKind::Index { .. } => self.optimize_index(&node, cx),
            ExprKind::Invoke { .. } => self.optimize_invoke(&node, cx),
            ExprKind::Conditional { .. } => self.optimize_conditional(&node),
            ExprKind::AndAlso { .. } | ExprKind::OrElse { .. } => self.optimize_logical(&node),
            ExprKind::Switch { .. } => self.optimize_switch(&node),
            ExprKind::TypeTest { .. } => self.optimize_type_test(&node),
            ExprKind::Try { .. } => self.optimize_try(&node),
            ExprKind::Convert { .. } => self.optimize_convert(&node),
            ExprKind::Constant(_)
            | ExprKind::Parameter(_)
            | ExprKind::Default
            | ExprKind::Lambda { .. }
            | ExprKind::Throw { .. }
            | ExprKind::Block { .. }
            | ExprKind::Goto { .. } => Ok(node),
        }
    }

    /// Context of each child in `for_each_child` order; children past the
    /// end of the list inherit the parent's context
    fn child_contexts(&self, expr: &Expr) -> Vec<VisitContext> {
        let plain = VisitContext::default();
        match expr.kind() {
            ExprKind::Call {
                receiver,
                method,
                args,
            } => receiver
                .iter()
                .map(|_| plain)
                .chain(self.argument_contexts(Some(method), args.len()))
                .collect(),
            ExprKind::MemberAccess { receiver, .. } => receiver.iter().map(|_| plain).collect(),
            ExprKind::New { constructor, args } => self.argument_contexts(constructor.as_ref(), args.len()),
            ExprKind::NewArray { items, .. } => vec![plain; items.len()],
            ExprKind::Index { indexer, args, .. } => std::iter::once(plain)
                .chain(self.argument_contexts(indexer.as_ref(), args.len()))
                .collect(),
            ExprKind::Invoke { args, .. } => vec![plain; args.len() + 1],
            ExprKind::Lambda { .. } => vec![plain],
            _ => Vec::new(),
        }
    }

    fn argument_contexts(&self, member: Option<&Member>, count: usize) -> Vec<VisitContext> {
        (0..count)
            .map(|position| {
                let read_only = member
                    .and_then(|m| m.parameter(position))
                    .map_or(false, |p| self.semantics.is_const_parameter(&p));
                VisitContext::argument(read_only)
            })
            .collect()
    }

    // ===== Helpers shared by the rules =====

    /// Folding may share the resulting value: it is immutable, or it only
    /// feeds a read-only parameter
    pub(crate) fn fold_permitted(&self, ty: &Type, cx: VisitContext) -> bool {
        self.config.constant_folding && (cx.const_context || self.semantics.is_immutable_type(ty))
    }

    /// Replace `node` by the first throwing operand found by `analysis`,
    /// keeping any impure operand evaluated before it
    pub(crate) fn propagate_throw(
        &mut self,
        node: &Expr,
        first: Option<&Expr>,
        rest: &[Expr],
        analysis: &OperandAnalysis,
    ) -> Result<Expr> {
        let (Some(throw), Some(index)) = (&analysis.first_throw, analysis.throw_index) else {
            return Ok(node.clone());
        };
        let coerced = change_type(throw, node.ty())?;

        let result = if analysis.all_pure {
            coerced
        } else {
            let mut exprs: Vec<Expr> = first
                .into_iter()
                .chain(rest)
                .take(index)
                .filter(|operand| !self.semantics.is_pure(operand))
                .cloned()
                .collect();
            exprs.push(coerced);
            Expr::block_typed(Vec::new(), exprs, node.ty().clone())
        };

        self.stats.throws_propagated += 1;
        self.log_rewrite("throw propagation", node, &result);
        Ok(result)
    }

    /// Whether the null-dereference rule applies to `receiver`
    pub(crate) fn dereferences_null(&self, receiver: Option<&Expr>, analysis: &OperandAnalysis) -> bool {
        self.config.null_dereference_prediction
            && analysis.all_pure
            && receiver.map_or(false, |r| self.semantics.is_always_null(r))
    }

    /// Throw of `NullReferenceException` replacing `node`
    pub(crate) fn predict_null_dereference(&mut self, node: &Expr) -> Expr {
        let result = evaluation::throw_new(
            node,
            Type::null_reference_exception(),
            "Object reference not set to an instance of an object.",
        );
        self.stats.null_dereferences_predicted += 1;
        self.log_rewrite("null dereference", node, &result);
        result
    }

    /// Fold `node` by running `member` over `values`
    ///
    /// Returns `Ok(None)` when no evaluator can be compiled.
    pub(crate) fn fold(&mut self, node: &Expr, member: &Member, values: &[Value]) -> Result<Option<Expr>> {
        let callable = match evaluation::compile(self.evaluators.as_ref(), member) {
            Some(callable) => callable,
            None => {
                self.stats.evaluator_refusals += 1;
                return Ok(None);
            }
        };
        let folded = evaluation::evaluate(node, callable.as_ref(), values)?;
        self.record_fold(node, &folded);
        Ok(Some(folded))
    }

    /// Count a fold that produced a constant or a throw
    pub(crate) fn record_fold(&mut self, node: &Expr, folded: &Expr) {
        match folded.kind() {
            ExprKind::Throw { .. } => self.stats.throws_propagated += 1,
            _ => self.stats.constants_folded += 1,
        }
        self.log_rewrite("constant folding", node, folded);
    }

    /// Replace `node` by one of its branches
    pub(crate) fn select_branch(&mut self, node: &Expr, branch: &Expr) -> Result<Expr> {
        let result = change_type(branch, node.ty())?;
        self.stats.branches_eliminated += 1;
        self.log_rewrite("branch elimination", node, &result);
        Ok(result)
    }

    pub(crate) fn log_rewrite(&self, rule: &str, before: &Expr, after: &Expr) {
        trace!(rule, before = %before, after = %after, "rewrite");
    }
}

#[cfg(test)]
#[path = "optimizer_tests.rs"]
mod tests;
