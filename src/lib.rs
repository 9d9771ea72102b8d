//! # misclass-rs: Worst-case misclassification of k-DNF classifiers
//!
//! **`misclass-rs`** answers a robustness question about boolean classifiers written as restricted k-DNF formulas:
//! if every input variable is read through an independent noisy channel, how likely is it that the observed
//! input is classified differently from the ground truth?
//!
//! ## The noise model
//!
//! Each variable `v` carries an error probability `p(v)` in `[0, 0.5)`: the observed value equals the true value
//! with probability `1 - p(v)` and is flipped with probability `p(v)`, independently of all other variables.
//! For an observed (possibly partial) assignment, the library computes the **maximum misclassification
//! probability**: the largest likelihood of any ground truth on which the formula disagrees with its value on
//! the observation.
//!
//! ## Restricted k-DNF
//!
//! Formulas are disjunctions of *terms*, every term a conjunction of exactly `k` distinct positive variables
//! (or a single variable when `k = 1`). Negation is not allowed inside a term, and every term has the same
//! arity. See [`dnf`] for the validator.
//!
//! ## Basic Usage
//!
//! ```rust
//! use misclass_rs::expr::Expr;
//! use misclass_rs::oracle::Oracle;
//! use misclass_rs::types::{Assignment, Probabilities, Var};
//!
//! // 1. Build a formula: (a AND b) OR (a AND c)
//! let formula = Expr::from_terms([["a", "b"], ["a", "c"]]);
//!
//! // 2. Describe the observation and the noise
//! let observed: Assignment = "a=true,b=true,c=false".parse().unwrap();
//! let probs: Probabilities = "a=0.1,b=0.1,c=0.1".parse().unwrap();
//!
//! // 3. Ask the oracle
//! let oracle = Oracle::default();
//! let p = oracle.max_misclassification_probability(&formula, &observed, &probs).unwrap();
//! assert!((p - 0.081).abs() < 1e-12);
//!
//! // 4. Would a noiseless `a` be worse? Yes: flipping `b` alone then has probability 0.09.
//! let risky = oracle.is_risky(&formula, &observed, &probs, &Var::new("a")).unwrap();
//! assert!(risky);
//! ```
//!
//! ## Core Components
//!
//! - **[`types`]**: Variables, assignments and error probabilities.
//! - **[`expr`]**: The [`Formula`][crate::expr::Formula] abstraction and the [`Expr`][crate::expr::Expr] syntax tree, with a parser.
//! - **[`dnf`]**: Recognition and validation of restricted k-DNF formulas.
//! - **[`likelihood`]**: The noise model.
//! - **[`ilp`]**: A small exact 0/1 integer-programming toolkit behind the [`Solver`][crate::ilp::Solver] trait.
//! - **[`program`]**: The integer program of the satisfying side.
//! - **[`oracle`]**: The maximum misclassification probability.
//! - **[`risky`]**: Variables whose noise removal increases the risk.
//! - **[`exhaustive`]**: A brute-force reference for small formulas.

pub mod dnf;
pub mod error;
pub mod exhaustive;
pub mod expr;
pub mod ilp;
pub mod likelihood;
pub mod oracle;
pub mod program;
pub mod risky;
pub mod types;

pub use error::{Error, Result};
