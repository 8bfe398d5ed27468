//! Optimizer configuration

use serde::{Deserialize, Serialize};

/// Optimization level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptimizationLevel {
    /// No optimizations, the input is returned as is
    None,
    /// Folding and branch elimination only
    Basic,
    /// Every rule
    Standard,
    /// Every rule, with larger folding limits
    Aggressive,
}

/// Optimization configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizationConfig {
    /// Optimization level
    pub level: OptimizationLevel,
    /// Evaluate pure members over constant operands
    pub constant_folding: bool,
    /// Turn dereferences of always-null receivers into throws
    pub null_dereference_prediction: bool,
    /// Inline invocations of lambda literals
    pub beta_reduction: bool,
    /// Merge nested conditionals sharing a default branch
    pub conditional_flattening: bool,
    /// Remove dead catch clauses and trivial try blocks
    pub try_simplification: bool,
    /// Largest array, in elements, that array construction may fold into
    pub max_folded_array_length: usize,
}

impl OptimizationConfig {
    /// Create config for optimization level
    pub fn for_level(level: OptimizationLevel) -> Self {
        match level {
            OptimizationLevel::None => Self {
                level,
                constant_folding: false,
                null_dereference_prediction: false,
                beta_reduction: false,
                conditional_flattening: false,
                try_simplification: false,
                max_folded_array_length: 0,
            },
            OptimizationLevel::Basic => Self {
                level,
                constant_folding: true,
                null_dereference_prediction: false,
                beta_reduction: false,
                conditional_flattening: false,
                try_simplification: false,
                max_folded_array_length: 64,
            },
            OptimizationLevel::Standard => Self {
                level,
                constant_folding: true,
                null_dereference_prediction: true,
                beta_reduction: true,
                conditional_flattening: true,
                try_simplification: true,
                max_folded_array_length: 1024,
            },
            OptimizationLevel::Aggressive => Self {
                level,
                constant_folding: true,
                null_dereference_prediction: true,
                beta_reduction: true,
                conditional_flattening: true,
                try_simplification: true,
                max_folded_array_length: 65536,
            },
        }
    }
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self::for_level(OptimizationLevel::Standard)
    }
}
