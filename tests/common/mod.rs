//! Shared helpers for the integration tests.

#![allow(dead_code)]

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use misclass_rs::expr::{Expr, Formula};
use misclass_rs::types::{Assignment, Probabilities};

pub fn assign(pairs: &[(&str, bool)]) -> Assignment {
    pairs.iter().map(|&(v, b)| (v, b)).collect()
}

pub fn probs(pairs: &[(&str, f64)]) -> Probabilities {
    pairs.iter().map(|&(v, p)| (v, p)).collect()
}

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-10
}

pub struct Instance {
    pub formula: Expr,
    pub assignment: Assignment,
    pub probs: Probabilities,
}

/// A random valid input: a k-DNF over at most `max_vars` variables, a (possibly partial)
/// assignment determining it, and probabilities with some exact zeros.
pub fn random_instance(rng: &mut ChaCha8Rng, max_vars: usize) -> Instance {
    let num_vars = rng.random_range(1..=max_vars);
    let k = rng.random_range(1..=num_vars.min(3));
    let num_terms = rng.random_range(1..=4);
    let terms: Vec<Vec<String>> = (0..num_terms)
        .map(|_| {
            rand::seq::index::sample(&mut *rng, num_vars, k)
                .into_iter()
                .map(|i| format!("v{}", i))
                .collect()
        })
        .collect();
    let formula = Expr::from_terms(terms);
    let atoms = formula.atoms();

    let mut probs: Probabilities = atoms
        .iter()
        .map(|v| {
            let p = if rng.random_bool(0.2) {
                0.0
            } else {
                rng.random_range(0.01..0.49)
            };
            (v, p)
        })
        .collect();
    if probs.all_zero() {
        if let Some(v) = atoms.iter().next() {
            probs.insert(v, 0.25);
        }
    }

    loop {
        let assignment: Assignment = atoms
            .iter()
            .filter_map(|v| rng.random_bool(0.8).then(|| (v, rng.random_bool(0.5))))
            .collect();
        if formula.evaluate(&assignment).is_some() {
            return Instance {
                formula,
                assignment,
                probs,
            };
        }
    }
}
