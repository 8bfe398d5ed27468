//! Extension points of the traversal driver

use exprtree_core::ast::Expr;

/// Hooks consulted by [`crate::ExpressionOptimizer`] around every node
///
/// A hook that returns a different node from `pre_optimize` or
/// `post_optimize` must keep its static type.
pub trait OptimizerHooks: Send + Sync {
    /// Whether rules may rewrite the node at all
    fn should_optimize(&self, _expr: &Expr) -> bool {
        true
    }

    /// Runs before the node's rule
    fn pre_optimize(&self, expr: Expr) -> Expr {
        expr
    }

    /// Runs after the node's rule, only when the rule changed the node
    fn post_optimize(&self, expr: Expr) -> Expr {
        expr
    }
}

/// Hooks that change nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHooks;

impl OptimizerHooks for DefaultHooks {}
