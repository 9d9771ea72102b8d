//! 0/1 integer linear programs and the solvers that optimize them.
//!
//! A [`Model`] has binary decision variables, linear constraints with integer coefficients,
//! and a real-valued linear objective to **maximize**. Any [`Solver`] can optimize it:
//!
//! | Implementation | Strategy | Use Case |
//! |----------------|----------|----------|
//! | [`BranchAndBound`] | Depth-first search with bound propagation and pruning | Production (default) |
//! | [`Enumerate`] | Tries every assignment | Reference results for tiny models |
//!
//! Both honor the time limit passed to [`Solver::solve`], and only report
//! [`Status::Optimal`] after a complete search.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use misclass_rs::ilp::{Cmp, Model, Solver, Status, BranchAndBound};
//!
//! // maximize 3x + 2y + z  subject to  x + y + z <= 2
//! let mut model = Model::new();
//! let x = model.add_binary("x");
//! let y = model.add_binary("y");
//! let z = model.add_binary("z");
//! model.add_constraint([(x, 1), (y, 1), (z, 1)], Cmp::Le, 2);
//! model.set_objective([(x, 3.0), (y, 2.0), (z, 1.0)]);
//!
//! let solution = BranchAndBound.solve(&model, Duration::from_secs(1));
//! assert_eq!(solution.status, Status::Optimal);
//! assert_eq!(solution.objective, 5.0);
//! assert!(solution.value(x) && solution.value(y) && !solution.value(z));
//! ```

use std::fmt;
use std::time::Duration;

mod branch;
mod enumerate;

pub use branch::BranchAndBound;
pub use enumerate::Enumerate;

/// Default solver implementation.
pub type DefaultSolver = BranchAndBound;

/// Handle of a binary decision variable inside a [`Model`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct BinVar(usize);

impl BinVar {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for BinVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Comparison of a constraint's left-hand side against its right-hand side.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Cmp {
    Le,
    Eq,
    Ge,
}

impl fmt::Display for Cmp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cmp::Le => write!(f, "<="),
            Cmp::Eq => write!(f, "=="),
            Cmp::Ge => write!(f, ">="),
        }
    }
}

/// A linear constraint `sum(coeff * var) <cmp> rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub terms: Vec<(BinVar, i64)>,
    pub cmp: Cmp,
    pub rhs: i64,
}

impl Constraint {
    /// Returns `true` if the constraint holds under a total assignment of the model.
    pub fn is_satisfied(&self, values: &[bool]) -> bool {
        let lhs: i64 = self
            .terms
            .iter()
            .filter(|(var, _)| values[var.0])
            .map(|&(_, coeff)| coeff)
            .sum();
        match self.cmp {
            Cmp::Le => lhs <= self.rhs,
            Cmp::Eq => lhs == self.rhs,
            Cmp::Ge => lhs >= self.rhs,
        }
    }
}

/// A 0/1 integer linear program with a maximization objective.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    names: Vec<String>,
    constraints: Vec<Constraint>,
    objective: Vec<f64>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a binary decision variable with objective coefficient `0`.
    pub fn add_binary(&mut self, name: impl Into<String>) -> BinVar {
        let var = BinVar(self.names.len());
        self.names.push(name.into());
        self.objective.push(0.0);
        var
    }

    /// Adds the constraint `sum(coeff * var) <cmp> rhs`.
    ///
    /// Repeated occurrences of the same variable are merged.
    pub fn add_constraint(
        &mut self,
        terms: impl IntoIterator<Item = (BinVar, i64)>,
        cmp: Cmp,
        rhs: i64,
    ) {
        let mut merged: Vec<(BinVar, i64)> = Vec::new();
        for (var, coeff) in terms {
            assert!(var.0 < self.names.len(), "Unknown variable {}", var);
            match merged.iter_mut().find(|(v, _)| *v == var) {
                Some((_, c)) => *c += coeff,
                None => merged.push((var, coeff)),
            }
        }
        merged.retain(|&(_, coeff)| coeff != 0);
        self.constraints.push(Constraint {
            terms: merged,
            cmp,
            rhs,
        });
    }

    /// Sets the objective coefficients of the given variables; the others keep theirs.
    pub fn set_objective(&mut self, terms: impl IntoIterator<Item = (BinVar, f64)>) {
        for (var, coeff) in terms {
            assert!(var.0 < self.names.len(), "Unknown variable {}", var);
            self.objective[var.0] = coeff;
        }
    }

    pub fn num_vars(&self) -> usize {
        self.names.len()
    }

    pub fn name(&self, var: BinVar) -> &str {
        &self.names[var.0]
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn objective(&self) -> &[f64] {
        &self.objective
    }

    /// Objective value of a total assignment.
    pub fn objective_value(&self, values: &[bool]) -> f64 {
        self.objective
            .iter()
            .zip(values)
            .filter(|&(_, &value)| value)
            .map(|(&coeff, _)| coeff)
            .sum()
    }

    /// Returns `true` if a total assignment satisfies every constraint.
    pub fn is_feasible(&self, values: &[bool]) -> bool {
        values.len() == self.num_vars() && self.constraints.iter().all(|c| c.is_satisfied(values))
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "maximize")?;
        for (i, &coeff) in self.objective.iter().enumerate() {
            if coeff != 0.0 {
                write!(f, " {:+} {}", coeff, self.names[i])?;
            }
        }
        writeln!(f)?;
        writeln!(f, "subject to")?;
        for constraint in &self.constraints {
            write!(f, " ")?;
            for &(var, coeff) in &constraint.terms {
                write!(f, " {:+} {}", coeff, self.names[var.0])?;
            }
            writeln!(f, " {} {}", constraint.cmp, constraint.rhs)?;
        }
        Ok(())
    }
}

/// Outcome of a solve.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Status {
    /// The search completed; the solution is provably optimal.
    Optimal,
    /// The time limit was hit; the solution is feasible but maybe not optimal.
    Feasible,
    /// The search completed without finding any feasible solution.
    Infeasible,
    /// The time limit was hit before any feasible solution was found.
    Unknown,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Optimal => "optimal",
            Status::Feasible => "feasible",
            Status::Infeasible => "infeasible",
            Status::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// The result of [`Solver::solve`].
///
/// `objective` and `values` describe the best solution found, and are only meaningful
/// when the status is [`Status::Optimal`] or [`Status::Feasible`].
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub status: Status,
    pub objective: f64,
    pub values: Vec<bool>,
    /// Number of search nodes (or enumerated assignments) visited.
    pub nodes: u64,
}

impl Solution {
    pub fn value(&self, var: BinVar) -> bool {
        self.values[var.0]
    }
}

/// A 0/1 integer programming backend.
pub trait Solver {
    /// Maximizes the objective of `model`, giving up after `time_limit`.
    fn solve(&self, model: &Model, time_limit: Duration) -> Solution;
}

impl<S: Solver + ?Sized> Solver for &S {
    fn solve(&self, model: &Model, time_limit: Duration) -> Solution {
        (**self).solve(model, time_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_constraint_merges_terms() {
        let mut model = Model::new();
        let x = model.add_binary("x");
        let y = model.add_binary("y");
        model.add_constraint([(x, 1), (y, 2), (x, 1), (y, -2)], Cmp::Le, 1);
        assert_eq!(model.constraints()[0].terms, vec![(x, 2)]);
    }

    #[test]
    fn test_feasibility_and_objective() {
        let mut model = Model::new();
        let x = model.add_binary("x");
        let y = model.add_binary("y");
        model.add_constraint([(x, 1), (y, 1)], Cmp::Le, 1);
        model.add_constraint([(y, 1)], Cmp::Ge, 1);
        model.set_objective([(x, 2.5), (y, -1.0)]);

        assert!(model.is_feasible(&[false, true]));
        assert!(!model.is_feasible(&[true, true]));
        assert!(!model.is_feasible(&[true, false]));
        assert!(!model.is_feasible(&[true]));
        assert_eq!(model.objective_value(&[true, true]), 1.5);
    }

    #[test]
    fn test_display() {
        let mut model = Model::new();
        let x = model.add_binary("x");
        let y = model.add_binary("y");
        model.add_constraint([(x, 1), (y, 1)], Cmp::Le, 1);
        model.set_objective([(x, 2.0)]);
        assert_eq!(model.to_string(), "maximize +2 x\nsubject to\n  +1 x +1 y <= 1\n");
    }
}
