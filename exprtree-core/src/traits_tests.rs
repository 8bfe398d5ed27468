#[cfg(test)]
mod tests {
    use crate::ast::Expr;
    use crate::member::{Member, ParameterRef};
    use crate::traits::*;
    use crate::types::Type;
    use crate::value::Value;
    use std::sync::Arc;

    // ===== Test Implementations =====

    /// Knows constants and nothing else
    struct ConstantsOnly;

    impl SemanticProvider for ConstantsOnly {
        fn is_pure(&self, _expr: &Expr) -> bool {
            false
        }

        fn is_pure_member(&self, _member: &Member) -> bool {
            false
        }

        fn is_pure_type(&self, _ty: &Type) -> bool {
            false
        }

        fn constant_value(&self, expr: &Expr) -> Option<Value> {
            expr.as_constant().cloned()
        }

        fn is_always_null(&self, _expr: &Expr) -> bool {
            false
        }

        fn is_never_null(&self, _expr: &Expr) -> bool {
            false
        }

        fn always_throws(&self, _expr: &Expr) -> bool {
            false
        }

        fn never_throws(&self, _expr: &Expr) -> bool {
            false
        }

        fn never_throws_member(&self, _member: &Member) -> bool {
            false
        }

        fn is_identity_function(&self, _expr: &Expr) -> bool {
            false
        }

        fn is_const_parameter(&self, _parameter: &ParameterRef) -> bool {
            false
        }

        fn is_immutable_type(&self, _ty: &Type) -> bool {
            false
        }
    }

    // ===== Value predicate defaults =====

    #[test]
    fn test_boolean_predicates() {
        let provider = ConstantsOnly;
        assert!(provider.is_true(&Expr::boolean(true)));
        assert!(provider.is_false(&Expr::boolean(false)));
        assert!(!provider.is_true(&Expr::int32(1)));
        assert!(provider.all_bits_one(&Expr::boolean(true)));
        assert!(provider.all_bits_zero(&Expr::boolean(false)));
    }

    #[test]
    fn test_numeric_predicates() {
        let provider = ConstantsOnly;
        assert!(provider.is_zero(&Expr::int32(0)));
        assert!(provider.is_one(&Expr::constant(Value::Int64(1), Type::Int64)));
        assert!(provider.is_one(&Expr::constant(Value::Float64(1.0), Type::Float64)));
        assert!(provider.all_bits_one(&Expr::int32(-1)));
        assert!(provider.is_min_value(&Expr::int32(i32::MIN)));
        assert!(provider.is_max_value(&Expr::constant(Value::Int64(i64::MAX), Type::Int64)));
        assert!(!provider.is_max_value(&Expr::int32(5)));
    }

    #[test]
    fn test_has_constant_value_default() {
        let provider = ConstantsOnly;
        assert!(provider.has_constant_value(&Expr::string("x")));
        assert!(!provider.has_constant_value(&Expr::default(Type::Int32)));
    }

    // ===== Callables and failures =====

    #[test]
    fn test_closure_is_callable() {
        let double = |args: &[Value]| match args {
            [Value::Int32(x)] => Ok(Value::Int32(x * 2)),
            _ => Err(Failure::new(Type::invalid_cast_exception(), "bad args")),
        };
        assert_eq!(double.invoke(&[Value::Int32(21)]), Ok(Value::Int32(42)));
        assert!(double.invoke(&[]).is_err());
    }

    #[test]
    fn test_unwrap_invocation_strips_one_layer() {
        let inner = Failure::new(Type::overflow_exception(), "overflow");
        let unwrapped = inner.clone().wrapped().unwrap_invocation();
        assert_eq!(unwrapped.ty, Type::overflow_exception());

        let twice = inner.clone().wrapped().wrapped().unwrap_invocation();
        assert_eq!(twice.ty, Type::target_invocation_exception());

        let plain = inner.unwrap_invocation();
        assert_eq!(plain.message, "overflow");
    }

    #[test]
    fn test_arc_factory_forwards() {
        struct Echo;

        impl EvaluatorFactory for Echo {
            fn compile(&self, _member: &Member) -> crate::error::Result<Arc<dyn Callable>> {
                Ok(Arc::new(|args: &[Value]| Ok::<_, Failure>(args[0].clone())))
            }
        }

        let factory: Arc<dyn EvaluatorFactory> = Arc::new(Echo);
        let member = Member::static_method(Type::Int32, "Id", vec![("x", Type::Int32)], Type::Int32);
        let callable = factory.compile(&member).unwrap();
        assert_eq!(callable.invoke(&[Value::Int32(9)]), Ok(Value::Int32(9)));
    }
}
