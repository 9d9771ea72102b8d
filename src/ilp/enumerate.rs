//! Exhaustive enumeration of every 0/1 assignment.
//!
//! Only usable for tiny models (the search space is `2^n`), but trivially correct, which
//! makes it the reference the other solvers are tested against.

use std::time::{Duration, Instant};

use log::debug;

use super::{Model, Solution, Solver, Status};

/// Largest model [`Enumerate`] accepts; bigger models report [`Status::Unknown`].
pub const MAX_ENUMERATED_VARS: usize = 24;

#[derive(Debug, Copy, Clone, Default)]
pub struct Enumerate;

impl Solver for Enumerate {
    fn solve(&self, model: &Model, time_limit: Duration) -> Solution {
        let n = model.num_vars();
        let mut best: Option<(f64, Vec<bool>)> = None;
        let mut nodes = 0;

        if n > MAX_ENUMERATED_VARS {
            debug!("enumerate: {} variables is too many", n);
            return Solution {
                status: Status::Unknown,
                objective: f64::NEG_INFINITY,
                values: vec![false; n],
                nodes,
            };
        }

        let deadline = Instant::now() + time_limit;
        let mut timed_out = false;
        for bits in 0u64..(1u64 << n) {
            if Instant::now() >= deadline {
                timed_out = true;
                break;
            }
            nodes += 1;
            let values: Vec<bool> = (0..n).map(|i| (bits >> i) & 1 == 1).collect();
            if !model.is_feasible(&values) {
                continue;
            }
            let objective = model.objective_value(&values);
            if best.as_ref().map_or(true, |(b, _)| objective > *b) {
                best = Some((objective, values));
            }
        }

        let status = match (timed_out, best.is_some()) {
            (false, true) => Status::Optimal,
            (false, false) => Status::Infeasible,
            (true, true) => Status::Feasible,
            (true, false) => Status::Unknown,
        };
        debug!("enumerate: {} after {} assignments", status, nodes);

        let (objective, values) = best.unwrap_or_else(|| (f64::NEG_INFINITY, vec![false; n]));
        Solution {
            status,
            objective,
            values,
            nodes,
        }
    }
}
