//! Static types carried by every expression node

use crate::value::Value;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Kind of a named type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// Reference type with identity
    Class,
    /// Value type copied on assignment
    Struct,
    /// Contract implemented by classes and structs
    Interface,
    /// Value type backed by an integer
    Enum,
}

/// A library or user defined type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamedType {
    /// Display name, including namespace if any
    pub name: String,
    /// Class, struct, interface or enum
    pub kind: TypeKind,
    /// No type may derive from a sealed type
    pub sealed: bool,
    /// Base class, `None` means `Object`
    pub base: Option<Type>,
    /// Directly implemented interfaces
    pub interfaces: Vec<Type>,
    /// Generic type arguments of a constructed generic type
    pub type_args: Vec<Type>,
    /// Open generic definition this type was constructed from
    pub generic_definition: Option<Type>,
}

impl NamedType {
    /// Create a non-generic named type with no base and no interfaces
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            sealed: matches!(kind, TypeKind::Struct | TypeKind::Enum),
            base: None,
            interfaces: Vec::new(),
            type_args: Vec::new(),
            generic_definition: None,
        }
    }

    /// Mark the type as sealed
    pub fn sealed(mut self) -> Self {
        self.sealed = true;
        self
    }

    /// Set the base class
    pub fn with_base(mut self, base: Type) -> Self {
        self.base = Some(base);
        self
    }

    /// Add an implemented interface
    pub fn with_interface(mut self, interface: Type) -> Self {
        self.interfaces.push(interface);
        self
    }

    /// Set the generic arguments and the definition they instantiate
    pub fn with_type_args(mut self, definition: Option<Type>, args: Vec<Type>) -> Self {
        self.generic_definition = definition;
        self.type_args = args;
        self
    }

    /// Finish building
    pub fn build(self) -> Type {
        Type::Named(Arc::new(self))
    }
}

/// Static type of an expression
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// No value
    Void,
    /// Boolean value type
    Boolean,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// 64-bit float
    Float64,
    /// Unicode scalar
    Char,
    /// Immutable string reference type
    String,
    /// Root of the type hierarchy
    Object,
    /// Value type that may also hold null
    Nullable(Box<Type>),
    /// Array with a given rank
    Array {
        /// Element type
        element: Box<Type>,
        /// Number of dimensions
        rank: usize,
    },
    /// Delegate type
    Function {
        /// Parameter types
        params: Vec<Type>,
        /// Return type
        ret: Box<Type>,
    },
    /// Library or user defined type
    Named(Arc<NamedType>),
}

macro_rules! well_known_exception {
    ($(#[$doc:meta])* $fn_name:ident, $name:literal) => {
        $(#[$doc])*
        pub fn $fn_name() -> Type {
            static TYPE: OnceLock<Type> = OnceLock::new();
            TYPE.get_or_init(|| {
                NamedType::new($name, TypeKind::Class)
                    .with_base(Type::exception())
                    .build()
            })
            .clone()
        }
    };
}

impl Type {
    /// Nullable wrapper around a value type
    pub fn nullable(inner: Type) -> Type {
        Type::Nullable(Box::new(inner))
    }

    /// Single dimensional array type
    pub fn array(element: Type) -> Type {
        Type::Array {
            element: Box::new(element),
            rank: 1,
        }
    }

    /// Delegate type
    pub fn function(params: Vec<Type>, ret: Type) -> Type {
        Type::Function {
            params,
            ret: Box::new(ret),
        }
    }

    /// Root exception type
    pub fn exception() -> Type {
        static TYPE: OnceLock<Type> = OnceLock::new();
        TYPE.get_or_init(|| NamedType::new("Exception", TypeKind::Class).build())
            .clone()
    }

    well_known_exception!(
        /// Raised when dereferencing null
        null_reference_exception,
        "NullReferenceException"
    );
    well_known_exception!(
        /// Raised by array indexing outside the bounds
        index_out_of_range_exception,
        "IndexOutOfRangeException"
    );
    well_known_exception!(
        /// Raised by array creation with a negative size
        overflow_exception,
        "OverflowException"
    );
    well_known_exception!(
        /// Raised by an invalid conversion
        invalid_cast_exception,
        "InvalidCastException"
    );
    well_known_exception!(
        /// Wrapper placed around exceptions thrown by reflective invocation
        target_invocation_exception,
        "TargetInvocationException"
    );

    /// Whether values of this type are copied rather than referenced
    pub fn is_value_type(&self) -> bool {
        match self {
            Type::Boolean
            | Type::Int32
            | Type::Int64
            | Type::Float64
            | Type::Char
            | Type::Nullable(_) => true,
            Type::Named(named) => matches!(named.kind, TypeKind::Struct | TypeKind::Enum),
            _ => false,
        }
    }

    /// Whether this is a `Nullable` wrapper
    pub fn is_nullable(&self) -> bool {
        matches!(self, Type::Nullable(_))
    }

    /// Value type that can never hold null
    pub fn is_non_nullable_value_type(&self) -> bool {
        self.is_value_type() && !self.is_nullable()
    }

    /// Whether a null value may be stored in this type
    pub fn admits_null(&self) -> bool {
        !matches!(self, Type::Void) && !self.is_non_nullable_value_type()
    }

    /// Strip one `Nullable` wrapper, if any
    pub fn unwrap_nullable(&self) -> &Type {
        match self {
            Type::Nullable(inner) => inner,
            other => other,
        }
    }

    /// Whether no other type can derive from this one
    pub fn is_sealed(&self) -> bool {
        match self {
            Type::Object | Type::Void => false,
            Type::Named(named) => named.sealed && named.kind != TypeKind::Interface,
            _ => true,
        }
    }

    /// Whether the type is a constructed generic type
    ///
    /// Delegate and nullable types count as generic since their
    /// assignability involves variance over type arguments.
    pub fn is_generic(&self) -> bool {
        match self {
            Type::Nullable(_) | Type::Function { .. } => true,
            Type::Named(named) => !named.type_args.is_empty() || named.generic_definition.is_some(),
            _ => false,
        }
    }

    /// Generic definition of a constructed generic named type
    pub fn generic_definition(&self) -> Option<&Type> {
        match self {
            Type::Named(named) => named.generic_definition.as_ref(),
            _ => None,
        }
    }

    /// Base type in the class hierarchy
    pub fn base_type(&self) -> Option<Type> {
        match self {
            Type::Object | Type::Void => None,
            Type::Named(named) if named.kind == TypeKind::Interface => None,
            Type::Named(named) => Some(named.base.clone().unwrap_or(Type::Object)),
            _ => Some(Type::Object),
        }
    }

    /// Whether a value of `source` can be stored in a location of this type
    /// without a conversion that changes representation
    pub fn is_assignable_from(&self, source: &Type) -> bool {
        if self == source {
            return true;
        }
        match (self, source) {
            (_, Type::Void) | (Type::Void, _) => false,
            (Type::Object, _) => true,
            (
                Type::Array { element: te, rank: tr },
                Type::Array { element: se, rank: sr },
            ) => tr == sr && !se.is_value_type() && te.is_assignable_from(se),
            (Type::Named(target), _) if target.kind == TypeKind::Interface => {
                source.implements(self)
            }
            _ => {
                let mut current = source.base_type();
                while let Some(ty) = current {
                    if &ty == self {
                        return true;
                    }
                    current = ty.base_type();
                }
                false
            }
        }
    }

    fn implements(&self, interface: &Type) -> bool {
        let mut current = Some(self.clone());
        while let Some(ty) = current {
            if let Type::Named(named) = &ty {
                for implemented in &named.interfaces {
                    if implemented == interface || implemented.implements(interface) {
                        return true;
                    }
                }
            }
            current = ty.base_type();
        }
        false
    }

    /// Value produced by `Default` of this type, when statically known
    pub fn default_value(&self) -> Option<Value> {
        match self {
            Type::Boolean => Some(Value::Boolean(false)),
            Type::Int32 => Some(Value::Int32(0)),
            Type::Int64 => Some(Value::Int64(0)),
            Type::Float64 => Some(Value::Float64(0.0)),
            Type::Char => Some(Value::Char('\0')),
            Type::Void => None,
            ty if ty.admits_null() => Some(Value::Null),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Void => write!(f, "void"),
            Type::Boolean => write!(f, "bool"),
            Type::Int32 => write!(f, "int"),
            Type::Int64 => write!(f, "long"),
            Type::Float64 => write!(f, "double"),
            Type::Char => write!(f, "char"),
            Type::String => write!(f, "string"),
            Type::Object => write!(f, "object"),
            Type::Nullable(inner) => write!(f, "{inner}?"),
            Type::Array { element, rank } => {
                write!(f, "{element}[{}]", ",".repeat(rank.saturating_sub(1)))
            }
            Type::Function { params, ret } => {
                write!(f, "(")?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{param}")?;
                }
                write!(f, ") -> {ret}")
            }
            Type::Named(named) => {
                write!(f, "{}", named.name)?;
                if !named.type_args.is_empty() {
                    write!(f, "<")?;
                    for (i, arg) in named.type_args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
        }
    }
}
