//! The independent bit-flip noise model.
//!
//! Every variable independently reports its true value with probability `1 - p` and the
//! flipped value with probability `p`, where `p` is its error probability.

use crate::error::{Error, Result};
use crate::types::{Assignment, Probabilities, Var};

/// Probability of observing `observed` when the true values are `ground_truth`.
///
/// Only the variables in the domain of `observed` contribute; each of them must also be
/// in the domain of `ground_truth` and `probs`. An empty observation has likelihood `1`.
pub fn assignment_likelihood(
    observed: &Assignment,
    ground_truth: &Assignment,
    probs: &Probabilities,
) -> Result<f64> {
    let mut likelihood = 1.0;
    for (var, value) in observed.iter() {
        let truth = ground_truth
            .get(var)
            .ok_or_else(|| Error::Domain(var.to_string()))?;
        let p = probs.get(var).ok_or_else(|| Error::Domain(var.to_string()))?;
        likelihood *= if value == truth { 1.0 - p } else { p };
    }
    Ok(likelihood)
}

/// Returns a copy of `assignment` with every variable of the term forced to `true`.
pub fn extend_to_satisfy<'a>(
    term_vars: impl IntoIterator<Item = &'a Var>,
    assignment: &Assignment,
) -> Assignment {
    let mut result = assignment.clone();
    for var in term_vars {
        result.insert(var, true);
    }
    result
}
