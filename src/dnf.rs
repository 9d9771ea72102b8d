//! Recognition and validation of restricted k-DNF formulas.
//!
//! A restricted k-DNF is a disjunction of terms, where every term is a conjunction of
//! exactly `k` distinct, non-negated variables. A single term is a valid k-DNF on its own,
//! and a bare variable is a single-term 1-DNF.
//!
//! [`validate`] is the gate every analysis passes through before computing anything.

use std::collections::BTreeSet;

use log::debug;

use crate::error::{Error, Result};
use crate::expr::{Formula, Shape};
use crate::types::{Assignment, Probabilities};

/// Returns `Some(k)` if `term` is a conjunction of exactly `k` distinct bare variables,
/// or a bare variable (`k = 1`).
///
/// A one-child conjunction is not accepted: `k = 1` terms must be bare variables.
pub fn conjunction_arity<F: Formula>(term: &F) -> Option<usize> {
    match term.shape() {
        Shape::Atom(_) => Some(1),
        Shape::And(children) if children.len() >= 2 => {
            let mut seen = BTreeSet::new();
            for child in children {
                match child.shape() {
                    Shape::Atom(var) if seen.insert(var) => {}
                    _ => return None,
                }
            }
            Some(children.len())
        }
        _ => None,
    }
}

/// Checks whether `term` is a conjunction of exactly `k` distinct bare variables.
pub fn is_conjunction<F: Formula>(term: &F, k: usize) -> bool {
    k > 0 && conjunction_arity(term) == Some(k)
}

/// Returns the common term arity `k` if `formula` is a valid restricted k-DNF.
///
/// A formula whose top-level connective is not a disjunction is treated as a single term.
/// For a disjunction, `k` is guessed from the first disjunct and every disjunct must be a
/// conjunction of that arity.
pub fn k_dnf_arity<F: Formula>(formula: &F) -> Option<usize> {
    let Shape::Or(terms) = formula.shape() else {
        return conjunction_arity(formula);
    };

    let first = terms.first()?;
    let k = match first.shape() {
        Shape::And(children) => children.len(),
        _ => 1,
    };
    terms.iter().all(|term| is_conjunction(term, k)).then_some(k)
}

/// Splits a k-DNF formula into its terms.
///
/// A single-term formula is returned as a one-element list containing itself.
pub fn split_terms<F: Formula>(formula: &F) -> Result<Vec<&F>> {
    if k_dnf_arity(formula).is_none() {
        return Err(Error::Format("the formula must be in k-DNF form".to_string()));
    }
    Ok(match formula.shape() {
        Shape::Or(terms) => terms.iter().collect(),
        _ => vec![formula],
    })
}

/// Validates a formula, an assignment and a probability map against each other.
///
/// The checks run in this order, each with its own error kind:
///
/// 1. the formula is a restricted k-DNF ([`Error::Format`]);
/// 2. the probability map is defined on exactly the atoms of the formula, every
///    probability is in `[0, 0.5)`, and at least one is positive ([`Error::Probability`]);
/// 3. substituting the assignment determines the formula's truth value, and the
///    assignment's domain is a subset of the atoms (`allow_partial`) or equal to them
///    ([`Error::Assignment`]).
///
/// Returns `k` on success.
pub fn validate<F: Formula>(
    formula: &F,
    assignment: &Assignment,
    probs: &Probabilities,
    allow_partial: bool,
) -> Result<usize> {
    let k = k_dnf_arity(formula)
        .ok_or_else(|| Error::Format("the formula must be in k-DNF form".to_string()))?;

    let atoms = formula.atoms();

    if let Some(var) = atoms.iter().find(|v| !probs.contains(v)) {
        return Err(Error::Probability(format!("missing probability for `{}`", var)));
    }
    if let Some(var) = probs.vars().find(|v| !atoms.contains(*v)) {
        return Err(Error::Probability(format!("`{}` does not occur in the formula", var)));
    }
    if let Some((var, p)) = probs.iter().find(|&(_, p)| !(0.0..0.5).contains(&p)) {
        return Err(Error::Probability(format!(
            "probability of `{}` is {}, expected a value in [0, 0.5)",
            var, p
        )));
    }
    if probs.all_zero() {
        return Err(Error::Probability("all probabilities are zero".to_string()));
    }

    if formula.evaluate(assignment).is_none() {
        return Err(Error::Assignment(
            "the assignment does not determine the formula's value".to_string(),
        ));
    }
    if let Some(var) = assignment.domain().find(|v| !atoms.contains(*v)) {
        return Err(Error::Assignment(format!("`{}` does not occur in the formula", var)));
    }
    if !allow_partial && assignment.len() != atoms.len() {
        return Err(Error::Assignment(format!(
            "expected a total assignment over {} variables, got {}",
            atoms.len(),
            assignment.len()
        )));
    }

    debug!(
        "validated {}-DNF over {} atoms ({} assigned)",
        k,
        atoms.len(),
        assignment.len()
    );
    Ok(k)
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::expr::Expr;

    fn f(s: &str) -> Expr {
        s.parse().unwrap()
    }

    fn probs(pairs: &[(&str, f64)]) -> Probabilities {
        pairs.iter().map(|&(v, p)| (v, p)).collect()
    }

    fn assign(pairs: &[(&str, bool)]) -> Assignment {
        pairs.iter().map(|&(v, b)| (v, b)).collect()
    }

    #[test]
    fn test_conjunction_arity() {
        assert_eq!(conjunction_arity(&f("a")), Some(1));
        assert_eq!(conjunction_arity(&f("a & b & c")), Some(3));
        assert_eq!(conjunction_arity(&f("a & a")), None);
        assert_eq!(conjunction_arity(&f("a & !b")), None);
        assert_eq!(conjunction_arity(&f("a | b")), None);
        assert_eq!(conjunction_arity(&f("(a & b) & c")), None);
        assert_eq!(conjunction_arity(&Expr::and([Expr::var("a")])), None);
        assert!(is_conjunction(&f("a & b"), 2));
        assert!(!is_conjunction(&f("a & b"), 3));
        assert!(!is_conjunction(&f("a"), 0));
    }

    #[test]
    fn test_k_dnf_arity() {
        assert_eq!(k_dnf_arity(&f("a")), Some(1));
        assert_eq!(k_dnf_arity(&f("a | b | c")), Some(1));
        assert_eq!(k_dnf_arity(&f("a & b")), Some(2));
        assert_eq!(k_dnf_arity(&f("(a & b) | (a & c)")), Some(2));
        assert_eq!(k_dnf_arity(&f("(a & b & c) | (d & e & f)")), Some(3));
    }

    #[test]
    fn test_k_dnf_arity_rejects() {
        assert_eq!(k_dnf_arity(&f("(a & b) | c")), None);
        assert_eq!(k_dnf_arity(&f("a | (b & c)")), None);
        assert_eq!(k_dnf_arity(&f("!a")), None);
        assert_eq!(k_dnf_arity(&f("!a | b")), None);
        assert_eq!(k_dnf_arity(&f("(a | b) & c")), None);
        assert_eq!(k_dnf_arity(&f("true")), None);
        assert_eq!(k_dnf_arity(&f("(a & a) | (b & c)")), None);
        assert_eq!(k_dnf_arity(&Expr::Or(vec![])), None);
    }

    #[test]
    fn test_split_terms() {
        let formula = f("(a & b) | (a & c)");
        let terms = split_terms(&formula).unwrap();
        assert_eq!(terms, vec![&f("a & b"), &f("a & c")]);

        let formula = f("a & b");
        assert_eq!(split_terms(&formula).unwrap(), vec![&formula]);

        assert!(matches!(split_terms(&f("(a & b) | c")), Err(Error::Format(_))));
    }

    #[test]
    fn test_validate_ok() {
        let formula = f("(a & b) | (a & c)");
        let p = probs(&[("a", 0.1), ("b", 0.0), ("c", 0.2)]);
        let total = assign(&[("a", true), ("b", true), ("c", false)]);
        assert_eq!(validate(&formula, &total, &p, false), Ok(2));
        assert_eq!(validate(&formula, &total, &p, true), Ok(2));

        let partial = assign(&[("a", false)]);
        assert_eq!(validate(&formula, &partial, &p, true), Ok(2));
    }

    #[test]
    fn test_validate_format() {
        let formula = f("(a & b) | c");
        let p = probs(&[("a", 0.1), ("b", 0.1), ("c", 0.1)]);
        let a = assign(&[("a", true), ("b", true), ("c", true)]);
        assert!(matches!(validate(&formula, &a, &p, true), Err(Error::Format(_))));
    }

    #[test]
    fn test_validate_probabilities() {
        let formula = f("(a & b) | (a & c)");
        let a = assign(&[("a", true), ("b", true), ("c", false)]);

        let missing = probs(&[("a", 0.1), ("b", 0.1)]);
        let extra = probs(&[("a", 0.1), ("b", 0.1), ("c", 0.1), ("d", 0.1)]);
        let half = probs(&[("a", 0.5), ("b", 0.1), ("c", 0.1)]);
        let negative = probs(&[("a", -0.1), ("b", 0.1), ("c", 0.1)]);
        let nan = probs(&[("a", f64::NAN), ("b", 0.1), ("c", 0.1)]);
        let zeros = probs(&[("a", 0.0), ("b", 0.0), ("c", 0.0)]);

        for p in [missing, extra, half, negative, nan, zeros] {
            assert!(
                matches!(validate(&formula, &a, &p, true), Err(Error::Probability(_))),
                "expected a probability error for {:?}",
                p
            );
        }
    }

    #[test]
    fn test_validate_assignment() {
        let formula = f("(a & b) | (a & c)");
        let p = probs(&[("a", 0.1), ("b", 0.1), ("c", 0.1)]);

        // Undetermined: `a & (b | c)` still depends on `b` and `c`.
        let undetermined = assign(&[("a", true)]);
        assert!(matches!(
            validate(&formula, &undetermined, &p, true),
            Err(Error::Assignment(_))
        ));

        // Determined but partial, in total mode.
        let partial = assign(&[("a", false)]);
        assert!(matches!(
            validate(&formula, &partial, &p, false),
            Err(Error::Assignment(_))
        ));

        // Outside the atom set.
        let stray = assign(&[("a", false), ("z", true)]);
        assert!(matches!(validate(&formula, &stray, &p, true), Err(Error::Assignment(_))));
    }
}
