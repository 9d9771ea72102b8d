//! Risky variables.
//!
//! A variable is *risky* when removing its noise makes things worse: with its error
//! probability set to zero, the remaining noisy variables can achieve a strictly greater
//! maximum misclassification probability than before.
//!
//! A noiseless variable reads correctly with probability `1` instead of `1 - p`, so zeroing
//! its noise can raise the likelihood of routes that do not flip it.

use std::collections::BTreeSet;

use log::debug;

use crate::dnf::validate;
use crate::error::{Error, Result};
use crate::expr::Formula;
use crate::ilp::Solver;
use crate::oracle::Oracle;
use crate::types::{Assignment, Probabilities, Var};

impl<S: Solver> Oracle<S> {
    /// Whether zeroing the error probability of `var` strictly increases the maximum
    /// misclassification probability.
    pub fn is_risky<F: Formula>(
        &self,
        formula: &F,
        assignment: &Assignment,
        probs: &Probabilities,
        var: &Var,
    ) -> Result<bool> {
        validate(formula, assignment, probs, true)?;
        if !formula.atoms().contains(var) {
            return Err(Error::Domain(var.to_string()));
        }

        let baseline = self.max_misclassification_probability(formula, assignment, probs)?;
        self.is_risky_against(formula, assignment, probs, var, baseline)
    }

    /// All atoms of `formula` that are risky.
    ///
    /// Equivalent to calling [`is_risky`][Oracle::is_risky] for every atom, but the baseline
    /// is computed once. Atoms that are already noiseless are never risky and are skipped.
    pub fn risky_variables<F: Formula>(
        &self,
        formula: &F,
        assignment: &Assignment,
        probs: &Probabilities,
    ) -> Result<BTreeSet<Var>> {
        validate(formula, assignment, probs, true)?;
        let baseline = self.max_misclassification_probability(formula, assignment, probs)?;

        let mut risky = BTreeSet::new();
        for var in formula.atoms() {
            if probs.get(&var) == Some(0.0) {
                continue;
            }
            if self.is_risky_against(formula, assignment, probs, &var, baseline)? {
                risky.insert(var);
            }
        }
        debug!("{} of {} variables are risky", risky.len(), probs.len());
        Ok(risky)
    }

    fn is_risky_against<F: Formula>(
        &self,
        formula: &F,
        assignment: &Assignment,
        probs: &Probabilities,
        var: &Var,
        baseline: f64,
    ) -> Result<bool> {
        // The noise of an unobserved variable never enters a likelihood.
        if !assignment.contains(var) {
            debug!("`{}` is unobserved, not risky", var);
            return Ok(false);
        }
        let reduced = probs.with_zeroed(var);
        let without_noise = if reduced.all_zero() {
            0.0
        } else {
            self.max_misclassification_probability(formula, assignment, &reduced)?
        };
        debug!(
            "risk with noise on `{}`: {}, without: {}",
            var, baseline, without_noise
        );
        Ok(without_noise > baseline)
    }
}

/// [`Oracle::is_risky`] with the default configuration.
pub fn is_risky<F: Formula>(
    formula: &F,
    assignment: &Assignment,
    probs: &Probabilities,
    var: &Var,
) -> Result<bool> {
    Oracle::default().is_risky(formula, assignment, probs, var)
}

/// [`Oracle::risky_variables`] with the default configuration.
pub fn risky_variables<F: Formula>(
    formula: &F,
    assignment: &Assignment,
    probs: &Probabilities,
) -> Result<BTreeSet<Var>> {
    Oracle::default().risky_variables(formula, assignment, probs)
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::expr::Expr;

    fn f(s: &str) -> Expr {
        s.parse().unwrap()
    }

    fn assign(pairs: &[(&str, bool)]) -> Assignment {
        pairs.iter().map(|&(v, b)| (v, b)).collect()
    }

    fn probs(pairs: &[(&str, f64)]) -> Probabilities {
        pairs.iter().map(|&(v, p)| (v, p)).collect()
    }

    #[test]
    fn test_risky_on_sat_side() {
        // Observed a=b=c=true. The best falsifying truth flips `a` (0.3 * 0.9 * 0.9).
        // Without noise on `a`, both `b` and `c` must flip: 0.1 * 0.1 = 0.01. Not risky.
        let formula = f("(a & b) | (a & c)");
        let a = assign(&[("a", true), ("b", true), ("c", true)]);
        let p = probs(&[("a", 0.3), ("b", 0.1), ("c", 0.1)]);
        assert_eq!(is_risky(&formula, &a, &p, &Var::new("a")), Ok(false));
    }

    #[test]
    fn test_risky_on_non_sat_side() {
        // Observed a=false, b=true: the only route flips `a`, with probability 0.1.
        // With `a` noiseless that route is impossible.
        let formula = f("a & b");
        let a = assign(&[("a", false), ("b", true)]);
        let p = probs(&[("a", 0.1), ("b", 0.2)]);
        assert_eq!(is_risky(&formula, &a, &p, &Var::new("a")), Ok(false));
        // Zeroing `b` raises `a & b`'s only route from 0.1 * 0.8 to 0.1 * 1.0.
        assert_eq!(is_risky(&formula, &a, &p, &Var::new("b")), Ok(true));
    }

    #[test]
    fn test_zero_probability_variable_is_never_risky() {
        let formula = f("(a & b) | (a & c)");
        let a = assign(&[("a", true), ("b", true), ("c", false)]);
        let p = probs(&[("a", 0.1), ("b", 0.0), ("c", 0.2)]);
        assert_eq!(is_risky(&formula, &a, &p, &Var::new("b")), Ok(false));
    }

    #[test]
    fn test_only_noisy_variable() {
        // Zeroing the only noisy variable makes the model noiseless: risk drops to 0.
        let formula = f("a | b");
        let a = assign(&[("a", true), ("b", false)]);
        let p = probs(&[("a", 0.2), ("b", 0.0)]);
        assert_eq!(is_risky(&formula, &a, &p, &Var::new("a")), Ok(false));
    }

    #[test]
    fn test_unobserved_variable_is_never_risky() {
        let formula = f("(a & b) | (c & d)");
        let a = assign(&[("a", true), ("b", true), ("c", true)]);
        let p = probs(&[("a", 0.1), ("b", 0.2), ("c", 0.3), ("d", 0.4)]);
        assert_eq!(is_risky(&formula, &a, &p, &Var::new("d")), Ok(false));
        assert!(!risky_variables(&formula, &a, &p).unwrap().contains(&Var::new("d")));
    }

    #[test]
    fn test_unknown_variable() {
        let formula = f("a | b");
        let a = assign(&[("a", true), ("b", false)]);
        let p = probs(&[("a", 0.2), ("b", 0.1)]);
        assert_eq!(
            is_risky(&formula, &a, &p, &Var::new("z")),
            Err(Error::Domain("z".to_string()))
        );
    }

    #[test]
    fn test_validation_comes_first() {
        let formula = f("a | b");
        let a = assign(&[("a", true), ("b", false)]);
        let p = probs(&[("a", 0.2)]);
        assert!(matches!(
            is_risky(&formula, &a, &p, &Var::new("z")),
            Err(Error::Probability(_))
        ));
    }

    #[test]
    fn test_risky_variables_matches_is_risky() {
        let formula = f("(a & b) | (c & d) | (a & d)");
        let a = assign(&[("a", false), ("b", true), ("c", true), ("d", false)]);
        let p = probs(&[("a", 0.1), ("b", 0.3), ("c", 0.2), ("d", 0.4)]);

        let all = risky_variables(&formula, &a, &p).unwrap();
        for var in formula.atoms() {
            assert_eq!(
                all.contains(&var),
                is_risky(&formula, &a, &p, &var).unwrap(),
                "mismatch for {}",
                var
            );
        }
    }
}
