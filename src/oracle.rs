//! The maximum misclassification probability.
//!
//! Given a k-DNF classifier, an observed (possibly partial) assignment, and independent
//! per-variable error probabilities, the oracle computes the greatest probability with
//! which some ground truth of the opposite class could have produced the observation.
//!
//! The computation branches on the class of the observation:
//!
//! - **Unsatisfying observation.** A single term flipping to true is enough to change the
//!   class, and the cheapest way for a term to become true is to force exactly its own
//!   variables. The answer is the most likely of these single-term explanations.
//! - **Satisfying observation.** Every term has to be falsified at once. This is a
//!   combinatorial problem, solved exactly as a 0/1 integer program (see
//!   [`program`][crate::program]). If the time budget runs out before optimality is proven,
//!   the call fails: an under-optimized answer would understate the risk.
//!
//! # Example
//!
//! ```
//! use misclass_rs::expr::Expr;
//! use misclass_rs::oracle::Oracle;
//! use misclass_rs::types::{Assignment, Probabilities};
//!
//! let formula: Expr = "(a & b) | (a & c)".parse().unwrap();
//! let assignment: Assignment = "a=false,b=true,c=true".parse().unwrap();
//! let probs: Probabilities = "a=0.1,b=0.1,c=0.1".parse().unwrap();
//!
//! let oracle = Oracle::default();
//! let p = oracle.max_misclassification_probability(&formula, &assignment, &probs).unwrap();
//! // Flipping `a` alone satisfies either term.
//! assert!((p - 0.1 * 0.9 * 0.9).abs() < 1e-12);
//! ```

use std::time::Duration;

use log::{debug, trace};

use crate::dnf::{split_terms, validate};
use crate::error::{Error, Result};
use crate::expr::Formula;
use crate::ilp::{DefaultSolver, Solver, Status};
use crate::likelihood::{assignment_likelihood, extend_to_satisfy};
use crate::program::build_program;
use crate::types::{Assignment, Probabilities};

/// Default wall-clock budget of one integer-program solve.
pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(10);

/// Oracle configuration.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct OracleConfig {
    /// Wall-clock budget of one integer-program solve.
    pub time_limit: Duration,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            time_limit: DEFAULT_TIME_LIMIT,
        }
    }
}

impl OracleConfig {
    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = time_limit;
        self
    }
}

/// Entry point of the analyses, parameterized by the integer-programming backend.
///
/// The oracle holds no state between calls: every call builds and solves its own program.
#[derive(Debug, Clone)]
pub struct Oracle<S = DefaultSolver> {
    config: OracleConfig,
    solver: S,
}

impl Oracle {
    pub fn with_config(config: OracleConfig) -> Self {
        Self::with_solver(config, DefaultSolver::default())
    }
}

impl Default for Oracle {
    fn default() -> Self {
        Self::with_config(OracleConfig::default())
    }
}

impl<S: Solver> Oracle<S> {
    pub fn with_solver(config: OracleConfig, solver: S) -> Self {
        Self { config, solver }
    }

    pub fn config(&self) -> &OracleConfig {
        &self.config
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    /// The maximum probability that `assignment` misclassifies `formula` under `probs`.
    ///
    /// The assignment may be partial, as long as it determines the formula's value. The
    /// result is always in `[0, 1]`.
    pub fn max_misclassification_probability<F: Formula>(
        &self,
        formula: &F,
        assignment: &Assignment,
        probs: &Probabilities,
    ) -> Result<f64> {
        let k = validate(formula, assignment, probs, true)?;
        let Some(sat) = formula.evaluate(assignment) else {
            return Err(Error::Assignment(
                "the assignment does not determine the formula's value".to_string(),
            ));
        };

        if sat {
            debug!("assignment satisfies the {}-DNF, solving the falsifying side", k);
            self.max_misclassification_sat(formula, k, assignment, probs)
        } else {
            debug!("assignment falsifies the {}-DNF, checking single-term flips", k);
            max_misclassification_non_sat(formula, assignment, probs)
        }
    }

    fn max_misclassification_sat<F: Formula>(
        &self,
        formula: &F,
        k: usize,
        assignment: &Assignment,
        probs: &Probabilities,
    ) -> Result<f64> {
        if !probable_unsatisfying_exists(formula, assignment, probs)? {
            debug!("no falsifying assignment has positive probability");
            return Ok(0.0);
        }

        let program = build_program(formula, k, assignment, probs)?;
        let solution = self.solver.solve(program.model(), self.config.time_limit);
        if solution.status != Status::Optimal {
            return Err(Error::Solver {
                status: solution.status,
            });
        }

        let p = program.probability(solution.objective);
        debug!(
            "optimal objective {} after {} nodes, probability {}",
            solution.objective, solution.nodes, p
        );
        trace!("most likely falsifying truth: {}", program.decode(&solution));
        Ok(p)
    }
}

/// Whether some total falsifying assignment has positive probability.
///
/// Zero-probability variables are certain, so they keep their assigned value; every other
/// variable, including those outside the assignment's domain, is set to `false`. Since a
/// k-DNF is monotone, this is the "most falsifying" completion: if it still satisfies the
/// formula, nothing does.
fn probable_unsatisfying_exists<F: Formula>(
    formula: &F,
    assignment: &Assignment,
    probs: &Probabilities,
) -> Result<bool> {
    let mut tested = Assignment::new();
    for var in formula.atoms() {
        let value = match (assignment.get(&var), probs.get(&var)) {
            (Some(value), Some(p)) if p == 0.0 => value,
            _ => false,
        };
        tested.insert(var, value);
    }

    match formula.evaluate(&tested) {
        Some(false) => {}
        Some(true) => return Ok(false),
        None => {
            return Err(Error::Assignment(
                "a total assignment left the formula undetermined".to_string(),
            ))
        }
    }

    Ok(assignment_likelihood(assignment, &tested, probs)? > 0.0)
}

/// The best single-term flip of a falsifying assignment.
fn max_misclassification_non_sat<F: Formula>(
    formula: &F,
    assignment: &Assignment,
    probs: &Probabilities,
) -> Result<f64> {
    let mut max_prob: f64 = 0.0;
    for term in split_terms(formula)? {
        let atoms = term.atoms();
        let flipped = extend_to_satisfy(&atoms, assignment);
        let p = assignment_likelihood(assignment, &flipped, probs)?;
        trace!("forcing {:?} true: probability {}", atoms, p);
        max_prob = max_prob.max(p);
    }
    Ok(max_prob)
}

/// [`Oracle::max_misclassification_probability`] with the default configuration.
pub fn max_misclassification_probability<F: Formula>(
    formula: &F,
    assignment: &Assignment,
    probs: &Probabilities,
) -> Result<f64> {
    Oracle::default().max_misclassification_probability(formula, assignment, probs)
}
