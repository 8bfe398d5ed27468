//! Read-only traversal of expression trees

use exprtree_core::ast::{CatchClause, Expr, ExprKind, Variable};

/// Trait for walking an expression tree without rebuilding it
///
/// Every method has a default that keeps walking, so an implementation only
/// overrides the node kinds it cares about. Binding constructs get their own
/// methods so scope-aware visitors can push and pop scopes.
pub trait ExpressionVisitor {
    /// Visit any node, dispatching to the specific methods
    fn visit(&mut self, expr: &Expr) {
        walk(self, expr);
    }

    /// Visit a variable reference
    fn visit_parameter(&mut self, _variable: &Variable) {}

    /// Visit a lambda literal
    fn visit_lambda(&mut self, _params: &[Variable], body: &Expr) {
        self.visit(body);
    }

    /// Visit a block and its local variables
    fn visit_block(&mut self, _variables: &[Variable], exprs: &[Expr]) {
        for expr in exprs {
            self.visit(expr);
        }
    }

    /// Visit one catch clause of a try
    fn visit_catch(&mut self, clause: &CatchClause) {
        if let Some(filter) = clause.filter() {
            self.visit(filter);
        }
        self.visit(clause.body());
    }
}

/// Dispatch `expr` to the visitor methods, then walk its children
pub fn walk<V: ExpressionVisitor + ?Sized>(visitor: &mut V, expr: &Expr) {
    match expr.kind() {
        ExprKind::Parameter(variable) => visitor.visit_parameter(variable),
        ExprKind::Lambda { params, body } => visitor.visit_lambda(params, body),
        ExprKind::Block { variables, exprs } => visitor.visit_block(variables, exprs),
        ExprKind::Try {
            body,
            handlers,
            finally,
            fault,
        } => {
            visitor.visit(body);
            for handler in handlers {
                visitor.visit_catch(handler);
            }
            for tail in finally.iter().chain(fault) {
                visitor.visit(tail);
            }
        }
        _ => expr.for_each_child(|child| visitor.visit(child)),
    }
}
