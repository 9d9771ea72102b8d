//! Brute-force reference for the misclassification oracle.
//!
//! Enumerates every total assignment of the atoms, keeps those classified differently from
//! the observation, and takes the most likely one. Exponential in the number of atoms, but
//! it shares no code with the optimized path beyond validation and the noise model, which
//! makes it the yardstick for [`Oracle`][crate::oracle::Oracle].

use log::debug;

use crate::dnf::validate;
use crate::error::{Error, Result};
use crate::expr::Formula;
use crate::likelihood::assignment_likelihood;
use crate::types::{Assignment, Probabilities, Var};

/// Largest atom set [`max_misclassification_probability`] will enumerate.
pub const MAX_EXHAUSTIVE_ATOMS: usize = 20;

/// The maximum misclassification probability, by enumeration.
///
/// Same inputs, validation and result as
/// [`Oracle::max_misclassification_probability`][crate::oracle::Oracle::max_misclassification_probability].
pub fn max_misclassification_probability<F: Formula>(
    formula: &F,
    assignment: &Assignment,
    probs: &Probabilities,
) -> Result<f64> {
    validate(formula, assignment, probs, true)?;
    let Some(observed) = formula.evaluate(assignment) else {
        return Err(Error::Assignment(
            "the assignment does not determine the formula's value".to_string(),
        ));
    };

    let atoms: Vec<Var> = formula.atoms().into_iter().collect();
    if atoms.len() > MAX_EXHAUSTIVE_ATOMS {
        return Err(Error::TooManyAtoms {
            atoms: atoms.len(),
            limit: MAX_EXHAUSTIVE_ATOMS,
        });
    }

    let mut best: f64 = 0.0;
    for bits in 0u64..(1u64 << atoms.len()) {
        let truth: Assignment = atoms
            .iter()
            .enumerate()
            .map(|(i, var)| (var, (bits >> i) & 1 == 1))
            .collect();
        if formula.evaluate(&truth) == Some(observed) {
            continue;
        }
        best = best.max(assignment_likelihood(assignment, &truth, probs)?);
    }
    debug!(
        "exhaustive: {} assignments over {} atoms, best {}",
        1u64 << atoms.len(),
        atoms.len(),
        best
    );
    Ok(best)
}
