//! End-to-end tests for the risky-variable analysis.

mod common;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use test_log::test;

use misclass_rs::exhaustive;
use misclass_rs::expr::{Expr, Formula};
use misclass_rs::risky::{is_risky, risky_variables};
use misclass_rs::types::Var;
use misclass_rs::Error;

use common::{assign, probs, random_instance};

#[test]
fn shared_variable_with_another_route() {
    // `a` occurs in every term. With `a` noiseless, flipping both `b` and `c` is the only
    // way left to falsify the formula.
    let formula: Expr = "(a & b) | (a & c)".parse().unwrap();
    let observed = assign(&[("a", true), ("b", true), ("c", true)]);

    let p = probs(&[("a", 0.1), ("b", 0.4), ("c", 0.4)]);
    // With noise on `a`: max(0.1 * 0.6 * 0.6, 0.9 * 0.4 * 0.4) = 0.144.
    // Without: 1.0 * 0.4 * 0.4 = 0.16 > 0.144.
    assert_eq!(is_risky(&formula, &observed, &p, &Var::new("a")), Ok(true));

    let p = probs(&[("a", 0.3), ("b", 0.1), ("c", 0.1)]);
    // With noise on `a`: 0.3 * 0.9 * 0.9 = 0.243. Without: 0.01.
    assert_eq!(is_risky(&formula, &observed, &p, &Var::new("a")), Ok(false));
}

#[test]
fn zero_probability_is_never_risky() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    for _ in 0..100 {
        let instance = random_instance(&mut rng, 6);
        for (var, p) in instance.probs.iter() {
            if p == 0.0 {
                assert_eq!(is_risky(&instance.formula, &instance.assignment, &instance.probs, var), Ok(false));
            }
        }
    }
}

#[test]
fn agrees_with_exhaustive_enumeration() {
    let mut rng = ChaCha8Rng::seed_from_u64(12);
    let mut checked = 0;
    for _ in 0..150 {
        let instance = random_instance(&mut rng, 6);
        let baseline =
            exhaustive::max_misclassification_probability(&instance.formula, &instance.assignment, &instance.probs).unwrap();
        for var in instance.formula.atoms() {
            let reduced = instance.probs.with_zeroed(&var);
            let without_noise = if reduced.all_zero() {
                0.0
            } else {
                exhaustive::max_misclassification_probability(&instance.formula, &instance.assignment, &reduced).unwrap()
            };
            // Ties are decided by rounding, not by the model.
            if (without_noise - baseline).abs() < 1e-9 {
                continue;
            }
            let expected = without_noise > baseline;
            let actual = is_risky(&instance.formula, &instance.assignment, &instance.probs, &var).unwrap();
            assert_eq!(
                actual, expected,
                "formula {}, assignment {}, probs {}, variable {}",
                instance.formula, instance.assignment, instance.probs, var
            );
            checked += 1;
        }
    }
    assert!(checked > 0);
}

#[test]
fn sweep_matches_single_tests() {
    let mut rng = ChaCha8Rng::seed_from_u64(13);
    for _ in 0..50 {
        let instance = random_instance(&mut rng, 6);
        let risky = risky_variables(&instance.formula, &instance.assignment, &instance.probs).unwrap();
        for var in &risky {
            assert_eq!(is_risky(&instance.formula, &instance.assignment, &instance.probs, var), Ok(true));
        }
    }
}

#[test]
fn unknown_variable_is_a_domain_error() {
    let formula: Expr = "(a & b) | (a & c)".parse().unwrap();
    let observed = assign(&[("a", true), ("b", true), ("c", true)]);
    let p = probs(&[("a", 0.1), ("b", 0.1), ("c", 0.1)]);
    assert_eq!(
        is_risky(&formula, &observed, &p, &Var::new("d")),
        Err(Error::Domain("d".to_string()))
    );
}
