//! Left-to-right evaluation order analysis of operand lists

use exprtree_core::ast::Expr;
use exprtree_core::traits::SemanticProvider;
use exprtree_core::value::Value;

/// What a rule knows about its operands, scanned in evaluation order
///
/// The scan stops at the first operand that always throws: later operands
/// never run, so they are neither inspected nor reflected in the flags.
#[derive(Debug, Clone, PartialEq)]
pub struct OperandAnalysis {
    /// Every scanned operand is pure
    pub all_pure: bool,
    /// Every scanned operand has a known value
    pub all_constant: bool,
    /// First operand that always throws
    pub first_throw: Option<Expr>,
    /// Position of `first_throw`, counting `first` as position 0 when present
    pub throw_index: Option<usize>,
    /// Known values in operand order, complete only when `all_constant`
    pub values: Vec<Value>,
}

impl OperandAnalysis {
    /// Scan the optional `first` operand, then `rest`
    pub fn analyze(semantics: &dyn SemanticProvider, first: Option<&Expr>, rest: &[Expr]) -> Self {
        let mut analysis = Self {
            all_pure: true,
            all_constant: true,
            first_throw: None,
            throw_index: None,
            values: Vec::with_capacity(rest.len() + usize::from(first.is_some())),
        };

        for (index, operand) in first.into_iter().chain(rest).enumerate() {
            if semantics.always_throws(operand) {
                analysis.first_throw = Some(operand.clone());
                analysis.throw_index = Some(index);
                break;
            }

            analysis.all_pure &= semantics.is_pure(operand);
            if analysis.all_constant {
                match semantics.constant_value(operand) {
                    Some(value) => analysis.values.push(value),
                    None => {
                        analysis.all_constant = false;
                        analysis.values.clear();
                    }
                }
            }
        }

        analysis
    }

    /// Whether an operand always throws
    pub fn throws(&self) -> bool {
        self.first_throw.is_some()
    }

    /// Every operand has a known value and none throws
    pub fn can_evaluate(&self) -> bool {
        !self.throws() && self.all_constant
    }
}

#[cfg(test)]
#[path = "analysis_tests.rs"]
mod tests;
