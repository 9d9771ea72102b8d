//! Exact branch and bound for 0/1 programs.
//!
//! The search is a plain depth-first walk over partial assignments:
//!
//! - **Propagation**: for every constraint we keep the activity of the variables fixed to
//!   `1`, and the sums of the positive and negative coefficients of the free variables.
//!   This gives the least and greatest achievable left-hand side, which both detects
//!   conflicts and forces free variables whose other value would make a constraint
//!   unsatisfiable. Propagation runs to a fixpoint at every node.
//! - **Bounding**: the objective of any completion is at most the value of the variables
//!   fixed to `1` plus every positive coefficient among the free ones. That optimistic
//!   completion usually violates some constraints, and repairing one means moving at least
//!   one of its free variables off its preferred value. For a set of constraints with
//!   pairwise disjoint free variables, the cheapest repair of each is subtracted. Subtrees
//!   that cannot beat the incumbent are pruned.
//! - **Branching**: variables are taken by decreasing objective magnitude, and the value
//!   that improves the objective is tried first, so good incumbents are found early.
//!
//! The deadline is checked at every node. A search cut short reports
//! [`Status::Feasible`] or [`Status::Unknown`], never [`Status::Optimal`].

use std::time::{Duration, Instant};

use log::{debug, trace};

use super::{Cmp, Model, Solution, Solver, Status};

/// Relative improvements smaller than this are not worth exploring.
const EPSILON: f64 = 1e-12;

/// The default exact solver.
#[derive(Debug, Copy, Clone, Default)]
pub struct BranchAndBound;

impl Solver for BranchAndBound {
    fn solve(&self, model: &Model, time_limit: Duration) -> Solution {
        debug!(
            "branch and bound: {} variables, {} constraints, time limit {:?}",
            model.num_vars(),
            model.constraints().len(),
            time_limit
        );
        let start = Instant::now();
        let mut search = Search::new(model, start + time_limit);
        search.run();

        let status = match (search.timed_out, search.best.is_some()) {
            (false, true) => Status::Optimal,
            (false, false) => Status::Infeasible,
            (true, true) => Status::Feasible,
            (true, false) => Status::Unknown,
        };
        debug!(
            "branch and bound: {} after {} nodes in {:?}",
            status,
            search.nodes,
            start.elapsed()
        );

        let (objective, values) = search
            .best
            .unwrap_or_else(|| (f64::NEG_INFINITY, vec![false; model.num_vars()]));
        Solution {
            status,
            objective,
            values,
            nodes: search.nodes,
        }
    }
}

/// Per-constraint activity bounds.
#[derive(Debug, Clone, Default)]
struct Activity {
    /// Sum of the coefficients of variables fixed to `1`.
    fixed: i64,
    /// Sum of the positive coefficients of free variables.
    pos_free: i64,
    /// Sum of the negative coefficients of free variables.
    neg_free: i64,
}

impl Activity {
    fn min(&self) -> i64 {
        self.fixed + self.neg_free
    }

    fn max(&self) -> i64 {
        self.fixed + self.pos_free
    }
}

struct Search<'a> {
    model: &'a Model,
    /// For each variable, the constraints it occurs in, with its coefficient.
    occurs: Vec<Vec<(usize, i64)>>,
    /// Branching order.
    order: Vec<usize>,
    values: Vec<Option<bool>>,
    trail: Vec<usize>,
    activity: Vec<Activity>,
    /// Objective value of the variables fixed to `1`.
    fixed_objective: f64,
    /// Sum of the positive objective coefficients of free variables.
    free_gain: f64,
    best: Option<(f64, Vec<bool>)>,
    /// Marks the free variables already charged by the current bound computation.
    charged: Vec<u64>,
    epoch: u64,
    deadline: Instant,
    timed_out: bool,
    nodes: u64,
}

impl<'a> Search<'a> {
    fn new(model: &'a Model, deadline: Instant) -> Self {
        let n = model.num_vars();
        let objective = model.objective();

        let mut occurs = vec![Vec::new(); n];
        let mut activity = vec![Activity::default(); model.constraints().len()];
        for (i, constraint) in model.constraints().iter().enumerate() {
            for &(var, coeff) in &constraint.terms {
                occurs[var.index()].push((i, coeff));
                if coeff > 0 {
                    activity[i].pos_free += coeff;
                } else {
                    activity[i].neg_free += coeff;
                }
            }
        }

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| objective[b].abs().total_cmp(&objective[a].abs()).then(a.cmp(&b)));

        Self {
            model,
            occurs,
            order,
            values: vec![None; n],
            trail: Vec::new(),
            activity,
            fixed_objective: 0.0,
            free_gain: objective.iter().filter(|&&c| c > 0.0).sum(),
            best: None,
            charged: vec![0; n],
            epoch: 0,
            deadline,
            timed_out: false,
            nodes: 0,
        }
    }

    fn assign(&mut self, var: usize, value: bool) {
        debug_assert!(self.values[var].is_none());
        self.values[var] = Some(value);
        self.trail.push(var);

        let coeff = self.model.objective()[var];
        if coeff > 0.0 {
            self.free_gain -= coeff;
        }
        if value {
            self.fixed_objective += coeff;
        }

        for &(i, a) in &self.occurs[var] {
            let act = &mut self.activity[i];
            if a > 0 {
                act.pos_free -= a;
            } else {
                act.neg_free -= a;
            }
            if value {
                act.fixed += a;
            }
        }
    }

    fn undo(&mut self, level: usize) {
        while self.trail.len() > level {
            let Some(var) = self.trail.pop() else { break };
            let Some(value) = self.values[var].take() else {
                continue;
            };

            let coeff = self.model.objective()[var];
            if coeff > 0.0 {
                self.free_gain += coeff;
            }
            if value {
                self.fixed_objective -= coeff;
            }

            for &(i, a) in &self.occurs[var] {
                let act = &mut self.activity[i];
                if a > 0 {
                    act.pos_free += a;
                } else {
                    act.neg_free += a;
                }
                if value {
                    act.fixed -= a;
                }
            }
        }
    }

    /// Checks every constraint and fixes forced variables until nothing changes.
    ///
    /// Returns `false` on conflict.
    fn propagate(&mut self) -> bool {
        loop {
            let mut forced = Vec::new();
            for (i, constraint) in self.model.constraints().iter().enumerate() {
                let act = &self.activity[i];
                let (lo, hi) = (act.min(), act.max());
                let upper = matches!(constraint.cmp, Cmp::Le | Cmp::Eq);
                let lower = matches!(constraint.cmp, Cmp::Ge | Cmp::Eq);
                if (upper && lo > constraint.rhs) || (lower && hi < constraint.rhs) {
                    return false;
                }
                for &(var, a) in &constraint.terms {
                    let var = var.index();
                    if self.values[var].is_some() {
                        continue;
                    }
                    // Least and greatest activity once `var` is fixed either way.
                    let (lo1, hi1) = (lo + a.max(0), hi + a.min(0));
                    let (lo0, hi0) = (lo - a.min(0), hi - a.max(0));
                    let one_ok = !(upper && lo1 > constraint.rhs) && !(lower && hi1 < constraint.rhs);
                    let zero_ok = !(upper && lo0 > constraint.rhs) && !(lower && hi0 < constraint.rhs);
                    match (zero_ok, one_ok) {
                        (true, true) => {}
                        (false, true) => forced.push((var, true)),
                        (true, false) => forced.push((var, false)),
                        (false, false) => return false,
                    }
                }
            }
            if forced.is_empty() {
                return true;
            }
            for (var, value) in forced {
                match self.values[var] {
                    None => self.assign(var, value),
                    Some(v) if v == value => {}
                    Some(_) => return false,
                }
            }
        }
    }

    /// Upper bound on the objective of any feasible completion of the current node.
    fn bound(&mut self) -> f64 {
        let model = self.model;
        let objective = model.objective();
        self.epoch += 1;
        let mut loss = 0.0;

        for (i, constraint) in model.constraints().iter().enumerate() {
            // Activity of the completion where every free variable takes its preferred value,
            // and the cheapest single move lowering or raising it.
            let mut completion = self.activity[i].fixed;
            let mut lower_cost = f64::INFINITY;
            let mut raise_cost = f64::INFINITY;
            let mut shared = false;
            for &(var, a) in &constraint.terms {
                let v = var.index();
                if self.values[v].is_some() {
                    continue;
                }
                let preferred = objective[v] > 0.0;
                if preferred {
                    completion += a;
                }
                let cost = objective[v].abs();
                if (a > 0) == preferred {
                    lower_cost = lower_cost.min(cost);
                } else {
                    raise_cost = raise_cost.min(cost);
                }
                shared |= self.charged[v] == self.epoch;
            }

            let upper = matches!(constraint.cmp, Cmp::Le | Cmp::Eq);
            let lower = matches!(constraint.cmp, Cmp::Ge | Cmp::Eq);
            let repair = if upper && completion > constraint.rhs {
                lower_cost
            } else if lower && completion < constraint.rhs {
                raise_cost
            } else {
                continue;
            };
            if repair == f64::INFINITY {
                // No free variable can move the activity the right way.
                return f64::NEG_INFINITY;
            }
            if shared || repair <= 0.0 {
                continue;
            }

            for &(var, _) in &constraint.terms {
                let v = var.index();
                if self.values[v].is_none() {
                    self.charged[v] = self.epoch;
                }
            }
            loss += repair;
        }

        self.fixed_objective + self.free_gain - loss
    }

    fn run(&mut self) {
        let level = self.trail.len();
        if self.propagate() {
            self.branch();
        }
        self.undo(level);
    }

    fn branch(&mut self) {
        self.nodes += 1;
        if Instant::now() >= self.deadline {
            self.timed_out = true;
            return;
        }
        if let Some(best) = self.best.as_ref().map(|(b, _)| *b) {
            if self.bound() <= best + EPSILON * best.abs().max(1.0) {
                return;
            }
        }

        let Some(var) = self.order.iter().copied().find(|&v| self.values[v].is_none()) else {
            // Every variable is fixed and propagation found no conflict.
            let values: Vec<bool> = self.values.iter().map(|v| v.unwrap_or(false)).collect();
            let objective = self.model.objective_value(&values);
            trace!("branch and bound: incumbent {} at node {}", objective, self.nodes);
            self.best = Some((objective, values));
            return;
        };

        let preferred = self.model.objective()[var] > 0.0;
        for value in [preferred, !preferred] {
            if self.timed_out {
                return;
            }
            let level = self.trail.len();
            self.assign(var, value);
            if self.propagate() {
                self.branch();
            }
            self.undo(level);
        }
    }
}
