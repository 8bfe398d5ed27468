//! Error types for expression tree rewriting

use crate::types::Type;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Cannot coerce expression of type {from} to {to}")]
    InvalidTypeCoercion { from: Type, to: Type },

    #[error("Evaluator for {member} returned a value incompatible with {expected}")]
    InvalidResult { member: String, expected: Type },

    #[error("No evaluator registered for {0}")]
    MissingEvaluator(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
