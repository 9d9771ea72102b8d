//! Error types.
//!
//! Every failure is fatal to the call that raised it: validation errors are reported
//! before any probability is computed, and nothing is retried internally.

use std::fmt;

use thiserror::Error;

use crate::ilp::Status;

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The formula is not a restricted k-DNF, or its arity cannot be inferred.
    #[error("formula is not in k-DNF form: {0}")]
    Format(String),

    /// The probability map does not cover exactly the atom set, a probability is out of
    /// `[0, 0.5)`, or every probability is zero.
    #[error("bad probabilities: {0}")]
    Probability(String),

    /// The assignment leaves the formula undetermined, or its domain is wrong.
    #[error("bad assignment: {0}")]
    Assignment(String),

    /// A lookup referenced a variable outside the expected domain.
    #[error("variable `{0}` is outside the expected domain")]
    Domain(String),

    /// The integer program was not solved to proven optimality.
    #[error("integer program was not solved to optimality (status: {status})")]
    Solver { status: Status },

    #[error("too many atoms for exhaustive enumeration: {atoms} (limit is {limit})")]
    TooManyAtoms { atoms: usize, limit: usize },

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Malformed text handed to one of the parsers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parse error at offset {offset}: {message}")]
pub struct ParseError {
    pub offset: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(offset: usize, message: impl fmt::Display) -> Self {
        Self {
            offset,
            message: message.to_string(),
        }
    }
}
