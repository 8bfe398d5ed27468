use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use exprtree_core::ast::{SwitchCase, Variable};
use exprtree_core::member::Member;
use exprtree_core::traits::{EvaluatorFactory, Failure};
use exprtree_core::types::Type;
use exprtree_core::value::Value;
use exprtree_core::Expr;
use exprtree_optimizer::{
    CachedEvaluatorFactory, DefaultSemanticProvider, ExpressionOptimizer, FunctionRegistry, OptimizationConfig,
    OptimizationLevel, SemanticCatalog,
};
use std::sync::Arc;

fn add() -> Member {
    Member::static_method(
        Type::Int32,
        "Add",
        vec![("a", Type::Int32), ("b", Type::Int32)],
        Type::Int32,
    )
}

fn log() -> Member {
    Member::static_method(Type::Object, "Log", vec![("x", Type::Int32)], Type::Int32)
}

fn registry() -> FunctionRegistry {
    FunctionRegistry::new().with(add(), |args| match args {
        [Value::Int32(a), Value::Int32(b)] => Ok(Value::Int32(a.wrapping_add(*b))),
        _ => Err(Failure::new(Type::invalid_cast_exception(), "bad operands")),
    })
}

fn semantics() -> Arc<DefaultSemanticProvider> {
    Arc::new(DefaultSemanticProvider::new(
        SemanticCatalog::new().with_pure_member(add()),
    ))
}

fn sum_tree(depth: u32) -> Expr {
    if depth == 0 {
        return Expr::int32(1);
    }
    Expr::call(None, add(), vec![sum_tree(depth - 1), sum_tree(depth - 1)])
}

fn create_test_trees() -> Vec<(&'static str, Expr)> {
    let x = Variable::new("x", Type::Int32);
    let y = Variable::new("y", Type::Int32);
    let c = Variable::new("c", Type::Boolean);

    let lambda = Expr::lambda(
        vec![x.clone(), y.clone()],
        Expr::call(None, add(), vec![x.expr(), y.expr()]),
    );
    let switch = Expr::switch(
        Expr::int32(3),
        None,
        (0..16)
            .map(|i| SwitchCase::new(vec![Expr::int32(i)], Expr::int32(i * 10)))
            .collect(),
        Some(Expr::int32(-1)),
        Type::Int32,
    );

    vec![
        ("constant_tree", sum_tree(8)),
        ("beta_reduction", Expr::invoke(lambda, vec![Expr::int32(5), Expr::int32(10)])),
        ("switch", switch),
        (
            "nothing_to_do",
            Expr::conditional(
                c.expr(),
                Expr::call(None, log(), vec![x.expr()]),
                Expr::call(None, add(), vec![x.expr(), y.expr()]),
            ),
        ),
    ]
}

fn benchmark_optimization_levels(c: &mut Criterion) {
    let trees = create_test_trees();
    let levels = vec![
        OptimizationLevel::None,
        OptimizationLevel::Basic,
        OptimizationLevel::Standard,
        OptimizationLevel::Aggressive,
    ];

    let mut group = c.benchmark_group("optimization_levels");

    for (name, tree) in &trees {
        for level in &levels {
            group.bench_with_input(
                BenchmarkId::new(*name, format!("{:?}", level)),
                &(tree, level),
                |b, (tree, level)| {
                    b.iter(|| {
                        let mut optimizer = ExpressionOptimizer::new(semantics(), Arc::new(registry()))
                            .with_config(OptimizationConfig::for_level(**level));
                        black_box(optimizer.optimize(tree))
                    });
                },
            );
        }
    }

    group.finish();
}

fn benchmark_evaluator_cache(c: &mut Criterion) {
    let tree = sum_tree(6);
    let mut group = c.benchmark_group("evaluator_cache");

    group.bench_function("uncached", |b| {
        let factory: Arc<dyn EvaluatorFactory> = Arc::new(registry());
        b.iter(|| {
            let mut optimizer = ExpressionOptimizer::new(semantics(), factory.clone());
            black_box(optimizer.optimize(&tree))
        });
    });

    group.bench_function("cached", |b| {
        let factory: Arc<dyn EvaluatorFactory> = Arc::new(CachedEvaluatorFactory::new(registry()));
        b.iter(|| {
            let mut optimizer = ExpressionOptimizer::new(semantics(), factory.clone());
            black_box(optimizer.optimize(&tree))
        });
    });

    group.finish();
}

fn benchmark_tree_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_size");

    for depth in [2, 4, 6, 8, 10] {
        let tree = sum_tree(depth);
        group.bench_with_input(BenchmarkId::from_parameter(tree.node_count()), &tree, |b, tree| {
            b.iter(|| {
                let mut optimizer = ExpressionOptimizer::new(semantics(), Arc::new(registry()));
                black_box(optimizer.optimize(tree))
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_optimization_levels,
    benchmark_evaluator_cache,
    benchmark_tree_size
);
criterion_main!(benches);
