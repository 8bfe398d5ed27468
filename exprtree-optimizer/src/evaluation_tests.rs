use super::*;
use crate::registry::FunctionRegistry;
use exprtree_core::ast::{ExprKind, Variable};
use exprtree_core::types::{NamedType, TypeKind};
use exprtree_core::value::DelegateTarget;

// ===== Helper Functions =====

fn add_method() -> Member {
    Member::static_method(
        Type::Int32,
        "Add",
        vec![("a", Type::Int32), ("b", Type::Int32)],
        Type::Int32,
    )
}

fn add(args: &[Value]) -> std::result::Result<Value, Failure> {
    match args {
        [Value::Int32(a), Value::Int32(b)] => a
            .checked_add(*b)
            .map(Value::Int32)
            .ok_or_else(|| Failure::new(Type::overflow_exception(), "overflow").wrapped()),
        _ => Err(Failure::new(Type::invalid_cast_exception(), "bad operands")),
    }
}

fn add_node() -> Expr {
    let a = Variable::new("a", Type::Int32);
    let b = Variable::new("b", Type::Int32);
    Expr::call(None, add_method(), vec![a.expr(), b.expr()])
}

fn thrown_type(expr: &Expr) -> Type {
    match expr.kind() {
        ExprKind::Throw {
            exception: Some(exception),
        } => exception.ty().clone(),
        other => panic!("expected throw, got {:?}", other),
    }
}

// ===== evaluate =====

#[test]
fn test_success_becomes_constant() {
    let node = add_node();
    let folded = evaluate(&node, &add, &[Value::Int32(2), Value::Int32(3)]).unwrap();
    assert_eq!(folded, Expr::int32(5));
}

#[test]
fn test_failure_becomes_unwrapped_throw() {
    let node = add_node();
    let folded = evaluate(&node, &add, &[Value::Int32(i32::MAX), Value::Int32(1)]).unwrap();
    assert_eq!(folded.ty(), &Type::Int32);
    assert_eq!(thrown_type(&folded), Type::overflow_exception());
}

#[test]
fn test_incompatible_result_is_an_error() {
    let node = add_node();
    let liar = |_: &[Value]| Ok::<_, Failure>(Value::string("five"));
    let err = evaluate(&node, &liar, &[]).unwrap_err();
    assert!(matches!(err, Error::InvalidResult { .. }));
}

#[test]
fn test_void_result_becomes_void_default() {
    let noop = Member::static_method(Type::Object, "Noop", vec![], Type::Void);
    let node = Expr::call(None, noop, vec![]);
    let folded = evaluate(&node, &|_: &[Value]| Ok::<_, Failure>(Value::Null), &[]).unwrap();
    assert_eq!(folded, Expr::default(Type::Void));
}

// ===== Arrays =====

#[test]
fn test_array_init() {
    let node = Expr::new_array_init(Type::Int32, vec![Expr::int32(1), Expr::int32(2)]);
    let folded = evaluate_array_init(&node, &Type::Int32, vec![Value::Int32(1), Value::Int32(2)], 16).unwrap();
    assert_eq!(folded.ty(), node.ty());
    match folded.as_constant() {
        Some(Value::Array(array)) => assert_eq!(array.items.len(), 2),
        other => panic!("expected array, got {:?}", other),
    }
    assert!(evaluate_array_init(&node, &Type::Int32, vec![Value::Int32(1); 3], 2).is_none());
}

#[test]
fn test_array_bounds_multi_dimensional() {
    let node = Expr::new_array_bounds(Type::Int32, vec![Expr::int32(2), Expr::int32(3)]);
    let folded = evaluate_array_bounds(&node, &Type::Int32, &[Value::Int32(2), Value::Int32(3)], 100).unwrap();
    match folded.as_constant() {
        Some(Value::Array(array)) => {
            assert_eq!(array.lengths, vec![2, 3]);
            assert_eq!(array.get(&[1, 2]), Some(&Value::Int32(0)));
        }
        other => panic!("expected array, got {:?}", other),
    }
}

#[test]
fn test_array_bounds_negative_throws_overflow() {
    let node = Expr::new_array_bounds(Type::String, vec![Expr::int32(-1)]);
    let folded = evaluate_array_bounds(&node, &Type::String, &[Value::Int32(-1)], 100).unwrap();
    assert_eq!(thrown_type(&folded), Type::overflow_exception());
}

#[test]
fn test_array_bounds_respects_limit() {
    let node = Expr::new_array_bounds(Type::Int32, vec![Expr::int32(1000)]);
    assert!(evaluate_array_bounds(&node, &Type::Int32, &[Value::Int32(1000)], 10).is_none());
}

#[test]
fn test_array_index() {
    let array = Value::Array(Arc::new(ArrayValue::vector(
        Type::Int32,
        vec![Value::Int32(10), Value::Int32(20)],
    )));
    let receiver = Expr::constant(array.clone(), Type::array(Type::Int32));
    let node = Expr::array_index(receiver, vec![Expr::int32(1)]);

    let folded = evaluate_array_index(&node, &array, &[Value::Int32(1)]).unwrap();
    assert_eq!(folded, Expr::int32(20));

    let out_of_range = evaluate_array_index(&node, &array, &[Value::Int32(2)]).unwrap();
    assert_eq!(thrown_type(&out_of_range), Type::index_out_of_range_exception());

    let null = evaluate_array_index(&node, &Value::Null, &[Value::Int32(0)]).unwrap();
    assert_eq!(thrown_type(&null), Type::null_reference_exception());

    assert!(evaluate_array_index(&node, &array, &[Value::Int32(0), Value::Int32(0)]).is_none());
}

// ===== Delegates and value types =====

#[test]
fn test_multicast_delegate_returns_last_result() {
    let first = Member::static_method(Type::Object, "First", vec![("x", Type::Int32)], Type::Int32);
    let second = Member::static_method(Type::Object, "Second", vec![("x", Type::Int32)], Type::Int32);
    let mut registry = FunctionRegistry::new();
    registry.register(first.clone(), |args: &[Value]| Ok(args[0].clone()));
    registry.register(second.clone(), |args: &[Value]| match args {
        [Value::Int32(x)] => Ok(Value::Int32(x * 10)),
        _ => Err(Failure::new(Type::invalid_cast_exception(), "bad")),
    });

    let fn_type = Type::function(vec![Type::Int32], Type::Int32);
    let delegate = DelegateValue {
        ty: fn_type.clone(),
        targets: vec![
            DelegateTarget {
                method: first,
                receiver: None,
            },
            DelegateTarget {
                method: second,
                receiver: None,
            },
        ],
    };
    let callee = Expr::constant(Value::Delegate(Arc::new(delegate.clone())), fn_type);
    let node = Expr::invoke(callee, vec![Expr::int32(4)]);

    let folded = evaluate_delegate(&node, &registry, &delegate, &[Value::Int32(4)]).unwrap();
    assert_eq!(folded, Some(Expr::int32(40)));
}

#[test]
fn test_delegate_with_unknown_target_is_refused() {
    let unknown = Member::static_method(Type::Object, "Unknown", vec![], Type::Int32);
    let fn_type = Type::function(vec![], Type::Int32);
    let delegate = DelegateValue {
        ty: fn_type.clone(),
        targets: vec![DelegateTarget {
            method: unknown,
            receiver: None,
        }],
    };
    let node = Expr::invoke(Expr::constant(Value::Delegate(Arc::new(delegate.clone())), fn_type), vec![]);
    let registry = FunctionRegistry::new();
    assert_eq!(evaluate_delegate(&node, &registry, &delegate, &[]).unwrap(), None);
}

#[test]
fn test_value_type_default() {
    let point = NamedType::new("Point", TypeKind::Struct).build();
    let node = Expr::new_value_type(point.clone());
    let folded = evaluate_value_type_default(&node).unwrap();
    assert_eq!(folded.ty(), &point);
    assert!(matches!(folded.as_constant(), Some(Value::Object(_))));

    let int = evaluate_value_type_default(&Expr::new_value_type(Type::Int32)).unwrap();
    assert_eq!(int, Expr::int32(0));
}
