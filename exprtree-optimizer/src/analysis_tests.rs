use super::*;
use crate::catalog::SemanticCatalog;
use crate::semantics::DefaultSemanticProvider;
use exprtree_core::ast::Variable;
use exprtree_core::member::Member;
use exprtree_core::types::Type;

// ===== Helper Functions =====

fn log_call() -> Expr {
    let log = Member::static_method(Type::Object, "Log", vec![("s", Type::String)], Type::Int32);
    Expr::call(None, log, vec![Expr::string("side effect")])
}

fn throw_int() -> Expr {
    Expr::throw_value(Value::exception(Type::overflow_exception(), "boom"), Type::Int32)
}

// ===== OperandAnalysis Tests =====

#[test]
fn test_all_constant_operands() {
    let semantics = DefaultSemanticProvider::default();
    let analysis = OperandAnalysis::analyze(&semantics, None, &[Expr::int32(1), Expr::int32(2)]);
    assert!(analysis.all_pure);
    assert!(analysis.all_constant);
    assert!(analysis.can_evaluate());
    assert_eq!(analysis.values, vec![Value::Int32(1), Value::Int32(2)]);
}

#[test]
fn test_first_operand_is_scanned_first() {
    let semantics = DefaultSemanticProvider::default();
    let receiver = Expr::string("abc");
    let analysis = OperandAnalysis::analyze(&semantics, Some(&receiver), &[Expr::int32(1)]);
    assert_eq!(analysis.values, vec![Value::string("abc"), Value::Int32(1)]);
}

#[test]
fn test_unknown_operand_clears_values() {
    let semantics = DefaultSemanticProvider::default();
    let x = Variable::new("x", Type::Int32);
    let analysis = OperandAnalysis::analyze(&semantics, None, &[Expr::int32(1), x.expr()]);
    assert!(analysis.all_pure);
    assert!(!analysis.all_constant);
    assert!(analysis.values.is_empty());
}

#[test]
fn test_scan_stops_at_first_throw() {
    let semantics = DefaultSemanticProvider::default();
    let throw = throw_int();
    let analysis = OperandAnalysis::analyze(&semantics, None, &[Expr::int32(1), throw.clone(), log_call()]);
    assert!(analysis.throws());
    assert_eq!(analysis.throw_index, Some(1));
    assert!(Expr::ptr_eq(analysis.first_throw.as_ref().unwrap(), &throw));
    // the impure operand after the throw never runs
    assert!(analysis.all_pure);
    assert!(!analysis.can_evaluate());
}

#[test]
fn test_impure_prefix_is_reported() {
    let semantics = DefaultSemanticProvider::new(SemanticCatalog::new());
    let analysis = OperandAnalysis::analyze(&semantics, Some(&log_call()), &[throw_int()]);
    assert!(!analysis.all_pure);
    assert_eq!(analysis.throw_index, Some(1));
}
