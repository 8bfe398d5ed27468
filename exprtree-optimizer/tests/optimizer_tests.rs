//! End to end behavior of the optimizer over a small member library

mod common;

use common::*;
use exprtree_core::ast::{CatchClause, SwitchCase, Variable};
use exprtree_core::member::Member;
use exprtree_core::types::Type;
use exprtree_core::value::Value;
use exprtree_core::{Expr, ExprKind};
use exprtree_optimizer::{
    CachedEvaluatorFactory, DefaultSemanticProvider, ExpressionOptimizer, OptimizationConfig, OptimizationLevel,
};
use std::sync::Arc;

#[test]
fn test_constant_call_folding() {
    let expr = call(add(), vec![Expr::int32(2), Expr::int32(3)]);
    let result = optimizer().optimize(&expr).unwrap();
    assert_eq!(result, Expr::constant(Value::Int32(5), Type::Int32));
}

#[test]
fn test_nested_folding_bottom_up() {
    let inner = call(concat(), vec![Expr::string("ab"), Expr::string("cd")]);
    let expr = Expr::member(Some(inner), length());
    assert_eq!(optimizer().optimize(&expr).unwrap(), Expr::int32(4));
}

#[test]
fn test_overflow_during_folding_is_thrown_at_runtime() {
    let expr = call(add(), vec![Expr::int32(i32::MAX), Expr::int32(1)]);
    let result = optimizer().optimize(&expr).unwrap();

    assert_eq!(result.ty(), &Type::Int32);
    assert_eq!(thrown_type(&result), Some(Type::overflow_exception()));
}

#[test]
fn test_throw_precedence_over_garbage() {
    let boom = throw("first", Type::Int32);
    // Ill-typed operands after the throw never run and are never inspected
    let garbage = Expr::convert(Expr::string("nonsense"), Type::Int32);
    let expr = call(add(), vec![boom.clone(), garbage]);

    assert_eq!(optimizer().optimize(&expr).unwrap(), boom);
}

#[test]
fn test_throw_precedence_across_node_kinds() {
    let boom = throw("boom", Type::Int32);
    let x = Variable::new("x", Type::Int32);
    let exprs = vec![
        call(add(), vec![x.expr(), boom.clone()]),
        Expr::new_object(pair_constructor(), vec![x.expr(), boom.clone()]),
        Expr::new_array_init(Type::Int32, vec![x.expr(), boom.clone(), x.expr()]),
        Expr::invoke(
            Expr::parameter(Variable::new("f", Type::function(vec![Type::Int32], Type::Int32))),
            vec![boom.clone()],
        ),
        Expr::array_index(
            Expr::parameter(Variable::new("items", Type::array(Type::Int32))),
            vec![boom.clone()],
        ),
    ];

    let mut optimizer = optimizer();
    for expr in exprs {
        let result = optimizer.optimize(&expr).unwrap();
        assert_eq!(result.ty(), expr.ty());
        assert_eq!(thrown_type(&result), Some(Type::exception()), "{}", expr);
    }
}

#[test]
fn test_null_dereference_never_compiles() {
    let factory = Arc::new(CountingFactory::new(registry()));
    let mut optimizer = ExpressionOptimizer::new(
        Arc::new(DefaultSemanticProvider::new(catalog())),
        factory.clone(),
    );

    let expr = Expr::member(Some(Expr::null(Type::String)), length());
    let result = optimizer.optimize(&expr).unwrap();

    assert_eq!(result.ty(), &Type::Int32);
    assert_eq!(thrown_type(&result), Some(Type::null_reference_exception()));
    assert_eq!(factory.compiles(), 0);
}

#[test]
fn test_conditional_collapse() {
    let a = Variable::new("a", Type::Int32);
    let b = Variable::new("b", Type::Int32);
    let mut optimizer = optimizer();

    let taken = optimizer
        .optimize(&Expr::conditional(Expr::boolean(true), a.expr(), b.expr()))
        .unwrap();
    assert_eq!(taken, a.expr());

    let skipped = optimizer
        .optimize(&Expr::conditional(Expr::boolean(false), a.expr(), b.expr()))
        .unwrap();
    assert_eq!(skipped, b.expr());
}

#[test]
fn test_conditional_branch_is_retyped() {
    let a = Variable::new("a", Type::Int32);
    let expr = Expr::conditional_typed(Expr::boolean(true), a.expr(), Expr::int32(0), Type::Void);

    let result = optimizer().optimize(&expr).unwrap();
    assert_eq!(result.ty(), &Type::Void);
}

fn number_switch(value: i32) -> Expr {
    Expr::switch(
        Expr::int32(value),
        None,
        vec![
            SwitchCase::new(vec![Expr::int32(1)], Expr::string("one")),
            SwitchCase::new(vec![Expr::int32(2)], Expr::string("two")),
        ],
        Some(Expr::string("other")),
        Type::String,
    )
}

#[test]
fn test_switch_folding() {
    let mut optimizer = optimizer();
    assert_eq!(optimizer.optimize(&number_switch(2)).unwrap(), Expr::string("two"));
    assert_eq!(optimizer.optimize(&number_switch(5)).unwrap(), Expr::string("other"));
}

#[test]
fn test_type_test_always_null() {
    let expr = Expr::type_is(Expr::null(sealed_ref_type()), sealed_ref_type());
    assert_eq!(optimizer().optimize(&expr).unwrap(), Expr::boolean(false));

    let exact = Expr::type_equal(Expr::null(sealed_ref_type()), sealed_ref_type());
    assert_eq!(optimizer().optimize(&exact).unwrap(), Expr::boolean(false));
}

#[test]
fn test_unused_catch_binding() {
    let ex = Variable::new("ex", Type::exception());
    let guarded = call(log(), vec![Expr::int32(1)]);
    let body = Expr::int32(-1);
    let clause = CatchClause::new(Type::exception(), Some(ex.clone()), None, body.clone());

    let result = optimizer()
        .optimize(&Expr::try_catch(guarded.clone(), vec![clause]))
        .unwrap();
    let ExprKind::Try { handlers, .. } = result.kind() else {
        panic!("expected try, got {}", result);
    };
    assert!(handlers[0].variable().is_none());
    assert!(handlers[0].filter().is_none());
    assert_eq!(handlers[0].body(), &body);

    // A used binding stays
    let code = Member::property(Type::exception(), "Code", Type::Int32, false);
    let used = CatchClause::new(
        Type::exception(),
        Some(ex.clone()),
        None,
        Expr::member(Some(ex.expr()), code),
    );
    let expr = Expr::try_catch(guarded, vec![used.clone()]);
    let result = optimizer().optimize(&expr).unwrap();
    assert!(Expr::ptr_eq(&result, &expr));
}

#[test]
fn test_fold_suppression_outside_const_context() {
    let produce = call(range(), vec![Expr::int32(3)]);

    // The array is mutable, so each evaluation must create a new one
    let alone = optimizer().optimize(&produce).unwrap();
    assert!(Expr::ptr_eq(&alone, &produce));

    // Count only reads its argument
    let consumed = call(count(), vec![produce]);
    assert_eq!(optimizer().optimize(&consumed).unwrap(), Expr::int32(3));
}

#[test]
fn test_beta_reduction_then_folding() {
    let x = Variable::new("x", Type::Int32);
    let y = Variable::new("y", Type::Int32);
    let lambda = Expr::lambda(vec![x.clone(), y.clone()], call(add(), vec![x.expr(), y.expr()]));
    let expr = Expr::invoke(lambda, vec![Expr::int32(1), Expr::int32(2)]);

    let mut optimizer = optimizer();
    assert_eq!(optimizer.optimize(&expr).unwrap(), Expr::int32(3));
    assert_eq!(optimizer.stats().beta_reductions, 1);
}

#[test]
fn test_shadowed_parameter_is_not_substituted() {
    let x = Variable::new("x", Type::Int32);
    let inner = Expr::lambda(vec![x.clone()], call(log(), vec![x.expr()]));
    let outer = Expr::lambda(vec![x.clone()], inner.clone());
    let expr = Expr::invoke(outer, vec![Expr::int32(9)]);

    let result = optimizer().optimize(&expr).unwrap();
    assert_eq!(result, inner);
}

#[test]
fn test_basic_level_skips_beta_reduction() {
    let x = Variable::new("x", Type::Int32);
    let lambda = Expr::lambda(vec![x.clone()], call(add(), vec![x.expr(), Expr::int32(1)]));
    let expr = Expr::invoke(lambda, vec![Expr::int32(1)]);

    let mut optimizer =
        optimizer().with_config(OptimizationConfig::for_level(OptimizationLevel::Basic));
    let result = optimizer.optimize(&expr).unwrap();
    assert!(Expr::ptr_eq(&result, &expr));
}

#[test]
fn test_shared_cache_across_optimizers() {
    let cache = Arc::new(CachedEvaluatorFactory::new(registry()));
    let semantics = Arc::new(DefaultSemanticProvider::new(catalog()));
    let expr = call(add(), vec![Expr::int32(20), Expr::int32(22)]);

    for _ in 0..3 {
        let mut optimizer = ExpressionOptimizer::new(semantics.clone(), cache.clone());
        assert_eq!(optimizer.optimize(&expr).unwrap(), Expr::int32(42));
    }
    let stats = cache.stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 2);
}

#[test]
fn test_stats_report() {
    let mut optimizer = optimizer();
    optimizer
        .optimize(&call(add(), vec![Expr::int32(1), Expr::int32(1)]))
        .unwrap();

    let stats = optimizer.stats();
    assert!(stats.reduction_percentage() > 0.0);
    assert!(stats.to_string().contains("Constants folded: 1"));
}

