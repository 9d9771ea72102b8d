//! Translation of the satisfying-side problem into a 0/1 integer program.
//!
//! Given a k-DNF formula and an assignment that satisfies it, we look for the total
//! assignment that falsifies the formula and is the most likely noisy observation. With one
//! decision variable `x_v` per atom:
//!
//! - every term `t` gets `sum(x_v for v in t) <= k - 1`, i.e. at least one of its variables
//!   is false, which makes the whole formula false;
//! - every zero-probability variable is pinned to its assigned value (or to `false` when it
//!   is unassigned), since its value cannot be explained by noise;
//! - the objective rewards agreement with the assignment by the log-likelihood ratio
//!   `ln(1 - p) - ln(p)` for a variable assigned `true` (and the negation of it for one
//!   assigned `false`, attached to `x_v = 1`).
//!
//! Adding the constant [`offset`][MisclassProgram::offset] to the objective value of a
//! solution gives its log-likelihood.

use std::collections::BTreeMap;

use log::debug;

use crate::dnf::split_terms;
use crate::error::{Error, Result};
use crate::expr::Formula;
use crate::ilp::{BinVar, Cmp, Model, Solution};
use crate::types::{Assignment, Probabilities, Var};

/// `ln(1 - p) - ln(p)`: how much more likely a correct reading is than a flipped one.
pub fn log_likelihood_ratio(p: f64) -> f64 {
    (1.0 - p).ln() - p.ln()
}

/// An integer program together with the mapping back to formula variables.
#[derive(Debug, Clone)]
pub struct MisclassProgram {
    model: Model,
    vars: BTreeMap<Var, BinVar>,
    offset: f64,
}

impl MisclassProgram {
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// The decision variable of an atom.
    pub fn var(&self, var: &Var) -> Option<BinVar> {
        self.vars.get(var).copied()
    }

    /// The log-likelihood of the assignment in which the optimizer disagrees with every
    /// free variable of the observed assignment.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Log-likelihood of a solution with the given objective value.
    pub fn log_likelihood(&self, objective: f64) -> f64 {
        objective + self.offset
    }

    /// Probability of a solution with the given objective value.
    pub fn probability(&self, objective: f64) -> f64 {
        self.log_likelihood(objective).exp().clamp(0.0, 1.0)
    }

    /// Reads the falsifying total assignment out of a solution.
    pub fn decode(&self, solution: &Solution) -> Assignment {
        self.vars
            .iter()
            .map(|(var, &x)| (var, solution.value(x)))
            .collect()
    }
}

/// Builds the integer program for a satisfying `assignment` of the k-DNF `formula`.
///
/// Performs no solving. The result only depends on the inputs: decision variables are
/// created in atom order and constraints in term order.
pub fn build_program<F: Formula>(
    formula: &F,
    k: usize,
    assignment: &Assignment,
    probs: &Probabilities,
) -> Result<MisclassProgram> {
    if k == 0 {
        return Err(Error::Format("term arity must be positive".to_string()));
    }

    let mut model = Model::new();
    let mut vars = BTreeMap::new();
    for atom in formula.atoms() {
        let x = model.add_binary(atom.name());
        vars.insert(atom, x);
    }

    let rhs = (k - 1) as i64;
    for term in split_terms(formula)? {
        let terms = term.atoms().into_iter().map(|v| (vars[&v], 1));
        model.add_constraint(terms, Cmp::Le, rhs);
    }

    let mut objective = Vec::new();
    let mut offset = 0.0;
    let mut pinned = 0;
    for (var, &x) in &vars {
        let p = probs
            .get(var)
            .ok_or_else(|| Error::Domain(var.to_string()))?;
        let value = assignment.get(var);
        if p == 0.0 {
            let target = value.unwrap_or(false) as i64;
            model.add_constraint([(x, 1)], Cmp::Eq, target);
            pinned += 1;
            continue;
        }
        match value {
            Some(true) => {
                objective.push((x, log_likelihood_ratio(p)));
                offset += p.ln();
            }
            Some(false) => {
                objective.push((x, -log_likelihood_ratio(p)));
                offset += (1.0 - p).ln();
            }
            None => {}
        }
    }
    model.set_objective(objective);

    debug!(
        "built program: {} variables ({} pinned), {} constraints, offset {}",
        model.num_vars(),
        pinned,
        model.constraints().len(),
        offset
    );
    Ok(MisclassProgram {
        model,
        vars,
        offset,
    })
}
