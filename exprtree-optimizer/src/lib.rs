//! ExprTree optimization framework
//!
//! This crate rewrites expression trees into smaller equivalent trees:
//! constant folding, dead branch elimination, null dereference prediction,
//! throw propagation and inlining of lambda literal invocations.

#![warn(missing_docs)]

pub mod analysis;
pub mod beta_reduction;
pub mod cache;
pub mod catalog;
pub mod coerce;
pub mod config;
pub mod evaluation;
pub mod free_variables;
pub mod hooks;
pub mod optimizer;
pub mod registry;
mod rules;
pub mod semantics;
pub mod stats;
pub mod visitor;

pub use analysis::OperandAnalysis;
pub use beta_reduction::BetaReducer;
pub use cache::{CacheStats, CachedEvaluatorFactory};
pub use catalog::{MemberTable, ParameterTable, SemanticCatalog, TypeTable};
pub use coerce::change_type;
pub use config::{OptimizationConfig, OptimizationLevel};
pub use free_variables::FreeVariables;
pub use hooks::{DefaultHooks, OptimizerHooks};
pub use optimizer::{ExpressionOptimizer, VisitContext};
pub use registry::FunctionRegistry;
pub use semantics::DefaultSemanticProvider;
pub use stats::OptimizationStats;
pub use visitor::ExpressionVisitor;
