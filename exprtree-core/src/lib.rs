//! Core types for expression tree rewriting
//!
//! This crate provides the building blocks shared by the optimizer and its
//! hosts:
//! - Immutable expression tree representation
//! - Static types and runtime values
//! - Member and parameter descriptors
//! - The semantic and evaluator capability traits
//! - Error types

pub mod ast;
pub mod error;
pub mod member;
pub mod traits;
pub mod types;
pub mod value;

pub use ast::{CatchClause, Expr, ExprKind, SwitchCase, Variable};
pub use error::{Error, Result};
pub use member::{Member, MemberKind, ParameterRef};
pub use traits::{Callable, EvaluatorFactory, Failure, SemanticProvider};
pub use types::{NamedType, Type, TypeKind};
pub use value::Value;
