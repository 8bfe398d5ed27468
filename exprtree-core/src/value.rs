//! Runtime values held by constant nodes and produced by evaluators

use crate::member::Member;
use crate::types::Type;
use std::fmt;
use std::sync::Arc;

/// Runtime value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null reference or empty nullable
    Null,
    /// Boolean value
    Boolean(bool),
    /// 32-bit integer
    Int32(i32),
    /// 64-bit integer
    Int64(i64),
    /// 64-bit float
    Float64(f64),
    /// Unicode scalar
    Char(char),
    /// Immutable string
    String(Arc<str>),
    /// Array of any rank
    Array(Arc<ArrayValue>),
    /// Instance of a named type
    Object(Arc<ObjectValue>),
    /// Exception instance
    Exception(Arc<ExceptionValue>),
    /// Delegate, possibly multicast
    Delegate(Arc<DelegateValue>),
}

/// Array contents stored in row-major order
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayValue {
    /// Element type
    pub element: Type,
    /// Length of each dimension
    pub lengths: Vec<usize>,
    /// Elements, row-major
    pub items: Vec<Value>,
}

impl ArrayValue {
    /// One dimensional array
    pub fn vector(element: Type, items: Vec<Value>) -> Self {
        Self {
            element,
            lengths: vec![items.len()],
            items,
        }
    }

    /// Static type of the array
    pub fn ty(&self) -> Type {
        Type::Array {
            element: Box::new(self.element.clone()),
            rank: self.lengths.len(),
        }
    }

    /// Element at the given indices, `None` when out of range or when the
    /// number of indices does not match the rank
    pub fn get(&self, indices: &[i64]) -> Option<&Value> {
        if indices.len() != self.lengths.len() {
            return None;
        }
        let mut offset = 0usize;
        for (&index, &length) in indices.iter().zip(&self.lengths) {
            let index = usize::try_from(index).ok().filter(|i| *i < length)?;
            offset = offset * length + index;
        }
        self.items.get(offset)
    }
}

/// Instance of a named type
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectValue {
    /// Runtime type
    pub ty: Type,
    /// Field values by name
    pub fields: Vec<(String, Value)>,
}

impl ObjectValue {
    /// Field value by name
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

/// Exception instance
#[derive(Debug, Clone, PartialEq)]
pub struct ExceptionValue {
    /// Runtime exception type
    pub ty: Type,
    /// Message
    pub message: String,
    /// Exception this one wraps
    pub inner: Option<Arc<ExceptionValue>>,
}

impl ExceptionValue {
    /// Create an exception with no inner exception
    pub fn new(ty: Type, message: impl Into<String>) -> Self {
        Self {
            ty,
            message: message.into(),
            inner: None,
        }
    }

    /// Wrap an exception the way reflective invocation does
    pub fn invocation_wrapper(inner: Arc<ExceptionValue>) -> Self {
        Self {
            ty: Type::target_invocation_exception(),
            message: "Exception has been thrown by the target of an invocation.".to_string(),
            inner: Some(inner),
        }
    }

    /// Whether this is an invocation wrapper around another exception
    pub fn is_invocation_wrapper(&self) -> bool {
        self.inner.is_some() && self.ty == Type::target_invocation_exception()
    }
}

/// One target of a delegate
#[derive(Debug, Clone, PartialEq)]
pub struct DelegateTarget {
    /// Method to call
    pub method: Member,
    /// Bound receiver for instance methods
    pub receiver: Option<Value>,
}

/// Delegate value, invoking each target in order
#[derive(Debug, Clone, PartialEq)]
pub struct DelegateValue {
    /// Delegate type
    pub ty: Type,
    /// Invocation list, never empty for a well-formed delegate
    pub targets: Vec<DelegateTarget>,
}

impl Value {
    /// String value
    pub fn string(s: impl AsRef<str>) -> Value {
        Value::String(Arc::from(s.as_ref()))
    }

    /// Exception value
    pub fn exception(ty: Type, message: impl Into<String>) -> Value {
        Value::Exception(Arc::new(ExceptionValue::new(ty, message)))
    }

    /// Whether this is the null value
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Boolean payload
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer payload widened to 64 bits
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int32(i) => Some(i64::from(*i)),
            Value::Int64(i) => Some(*i),
            _ => None,
        }
    }

    /// Exact runtime type, `None` for null
    pub fn runtime_type(&self) -> Option<Type> {
        Some(match self {
            Value::Null => return None,
            Value::Boolean(_) => Type::Boolean,
            Value::Int32(_) => Type::Int32,
            Value::Int64(_) => Type::Int64,
            Value::Float64(_) => Type::Float64,
            Value::Char(_) => Type::Char,
            Value::String(_) => Type::String,
            Value::Array(array) => array.ty(),
            Value::Object(object) => object.ty.clone(),
            Value::Exception(exception) => exception.ty.clone(),
            Value::Delegate(delegate) => delegate.ty.clone(),
        })
    }

    /// Equality used by a switch without a custom comparison: primitives and
    /// strings compare by value, every other reference by identity
    pub fn default_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Array(a), Value::Array(b)) => Arc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            (Value::Exception(a), Value::Exception(b)) => Arc::ptr_eq(a, b),
            (Value::Delegate(a), Value::Delegate(b)) => Arc::ptr_eq(a, b),
            _ => self == other,
        }
    }

    /// Whether this value can be the value of an expression of type `ty`
    pub fn is_compatible_with(&self, ty: &Type) -> bool {
        match self.runtime_type() {
            None => ty.admits_null(),
            Some(runtime) => {
                ty.is_assignable_from(&runtime) || ty.unwrap_nullable() == &runtime
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Int32(i) => write!(f, "{i}"),
            Value::Int64(i) => write!(f, "{i}L"),
            Value::Float64(x) => write!(f, "{x:?}"),
            Value::Char(c) => write!(f, "'{c}'"),
            Value::String(s) => write!(f, "\"{s}\""),
            Value::Array(array) => {
                write!(f, "{}[", array.element)?;
                for (i, item) in array.items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Object(object) => write!(f, "<{}>", object.ty),
            Value::Exception(exception) => write!(f, "{}(\"{}\")", exception.ty, exception.message),
            Value::Delegate(delegate) => {
                write!(f, "delegate")?;
                for target in &delegate.targets {
                    write!(f, " {}", target.method.name())?;
                }
                Ok(())
            }
        }
    }
}
