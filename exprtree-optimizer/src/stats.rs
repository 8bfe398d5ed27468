//! Optimization statistics tracking

use serde::{Deserialize, Serialize};
use std::fmt;

/// Statistics about rewrites performed during one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizationStats {
    /// Number of nodes before optimization
    pub nodes_before: usize,
    /// Number of nodes after optimization
    pub nodes_after: usize,
    /// Nodes replaced by a constant
    pub constants_folded: usize,
    /// Nodes replaced by the throw of one of their operands, or by the
    /// throw observed while folding
    pub throws_propagated: usize,
    /// Dereferences of always-null receivers turned into throws
    pub null_dereferences_predicted: usize,
    /// Conditionals, switches and short-circuit operators reduced to one
    /// branch, and try blocks reduced to their body
    pub branches_eliminated: usize,
    /// Lambda literal invocations inlined
    pub beta_reductions: usize,
    /// Unused catch variables dropped
    pub catch_bindings_dropped: usize,
    /// Catch filters removed, with or without their clause
    pub filters_removed: usize,
    /// Folds abandoned because no evaluator could be compiled
    pub evaluator_refusals: usize,
    /// Time spent optimizing (microseconds)
    pub optimization_time_us: u64,
}

impl OptimizationStats {
    /// Create new statistics tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculate reduction percentage
    pub fn reduction_percentage(&self) -> f64 {
        if self.nodes_before == 0 || self.nodes_after >= self.nodes_before {
            0.0
        } else {
            ((self.nodes_before - self.nodes_after) as f64 / self.nodes_before as f64) * 100.0
        }
    }

    /// Get total rewrites performed
    pub fn total_optimizations(&self) -> usize {
        self.constants_folded
            + self.throws_propagated
            + self.null_dereferences_predicted
            + self.branches_eliminated
            + self.beta_reductions
            + self.catch_bindings_dropped
            + self.filters_removed
    }

    /// Merge stats from another instance
    pub fn merge(&mut self, other: &OptimizationStats) {
        self.constants_folded += other.constants_folded;
        self.throws_propagated += other.throws_propagated;
        self.null_dereferences_predicted += other.null_dereferences_predicted;
        self.branches_eliminated += other.branches_eliminated;
        self.beta_reductions += other.beta_reductions;
        self.catch_bindings_dropped += other.catch_bindings_dropped;
        self.filters_removed += other.filters_removed;
        self.evaluator_refusals += other.evaluator_refusals;
        self.optimization_time_us += other.optimization_time_us;
    }
}

impl fmt::Display for OptimizationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Optimization Statistics:")?;
        writeln!(
            f,
            "  Nodes: {} -> {} ({:.1}% reduction)",
            self.nodes_before,
            self.nodes_after,
            self.reduction_percentage()
        )?;
        writeln!(f, "  Constants folded: {}", self.constants_folded)?;
        writeln!(f, "  Throws propagated: {}", self.throws_propagated)?;
        writeln!(f, "  Null dereferences predicted: {}", self.null_dereferences_predicted)?;
        writeln!(f, "  Branches eliminated: {}", self.branches_eliminated)?;
        writeln!(f, "  Beta reductions: {}", self.beta_reductions)?;
        writeln!(f, "  Catch bindings dropped: {}", self.catch_bindings_dropped)?;
        writeln!(f, "  Filters removed: {}", self.filters_removed)?;
        writeln!(f, "  Evaluator refusals: {}", self.evaluator_refusals)?;
        writeln!(f, "  Total optimizations: {}", self.total_optimizations())?;
        writeln!(f, "  Time: {:.3}ms", self.optimization_time_us as f64 / 1000.0)?;
        Ok(())
    }
}
