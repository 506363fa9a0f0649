use std::cell::OnceCell;

use good_lp::{Expression, Solution, SolverModel, Variable, default_solver, variable, variables};
use ridewise_domain::PreferenceSet;

use crate::model::{PeriodicRideCounts, PeriodicRideTimes, PeriodicRideWeights, SolveOptions};
use crate::{NoSolution, capacity_contradiction, round_count};

enum Goal<'b> {
    MaximizeRides { budgets: &'b [u64] },
    MinimizeTime { min_total: u32 },
}

/// Integer-program builder and solver driver for the case where ride time
/// costs vary across discrete time periods, known up front.
///
/// Ride counts are decided per (ride, period) pair; ride-level preferences
/// (required, avoid, repeat cap, distinctness) range over each ride's sum
/// across periods, while the time budget binds within each period
/// independently.
pub struct PeriodicPlanner<'a> {
    rides: Vec<PeriodicRideTimes<'a>>,
    periods: usize,
    preferences: PreferenceSet<Vec<u64>>,
    options: SolveOptions,
    weights: OnceCell<PeriodicRideWeights<'a>>,
}

impl<'a> PeriodicPlanner<'a> {
    pub fn new(
        periods: usize,
        rides: impl IntoIterator<Item = PeriodicRideTimes<'a>>,
        preferences: PreferenceSet<Vec<u64>>,
    ) -> Self {
        let rides: Vec<PeriodicRideTimes<'a>> = rides.into_iter().collect();
        debug_assert!(
            rides
                .iter()
                .all(|ride| ride.wait_times.len() == periods && ride.ride_times.len() == periods)
        );
        Self {
            rides,
            periods,
            preferences,
            options: SolveOptions::default(),
            weights: OnceCell::new(),
        }
    }

    pub fn with_options(mut self, options: SolveOptions) -> Self {
        self.options = options;
        self
    }

    /// Total time cost per ride and period: that period's wait time plus
    /// ride duration. Computed once per planner instance.
    pub fn ride_weights(&self) -> &PeriodicRideWeights<'a> {
        self.weights.get_or_init(|| {
            self.rides
                .iter()
                .map(|ride| {
                    let per_period = ride
                        .wait_times
                        .iter()
                        .zip(&ride.ride_times)
                        .map(|(&wait, &active)| wait + active)
                        .collect();
                    (ride.name, per_period)
                })
                .collect()
        })
    }

    /// Whether the preferences are structurally infeasible for this ride
    /// list, without invoking the solver.
    pub fn has_contradiction(&self) -> bool {
        capacity_contradiction(self.rides.len(), &self.preferences)
    }

    /// Maximizes the total number of rides taken across all periods, with
    /// each period's time spending bounded by that period's budget entry.
    pub fn maximize_rides(
        &self,
        ride_weights: &PeriodicRideWeights<'a>,
    ) -> Result<PeriodicRideCounts<'a>, NoSolution> {
        self.check_preconditions()?;
        let Some(budgets) = self.preferences.max_time() else {
            tracing::debug!(
                reject_reason = "missing_max_time",
                rides = self.rides.len(),
                periods = self.periods,
                "maximize-rides without per-period time budgets is unbounded"
            );
            return Err(NoSolution);
        };
        debug_assert_eq!(budgets.len(), self.periods);
        self.solve(ride_weights, Goal::MaximizeRides { budgets })
    }

    /// Minimizes the total time spent across all periods while taking at
    /// least `min_total_rides` rides overall.
    pub fn minimize_time(
        &self,
        ride_weights: &PeriodicRideWeights<'a>,
    ) -> Result<PeriodicRideCounts<'a>, NoSolution> {
        self.check_preconditions()?;
        let Some(min_total) = self.preferences.min_total_rides() else {
            tracing::debug!(
                reject_reason = "missing_min_total_rides",
                rides = self.rides.len(),
                periods = self.periods,
                "minimize-time without a ride floor is trivially zero"
            );
            return Err(NoSolution);
        };
        self.solve(ride_weights, Goal::MinimizeTime { min_total })
    }

    fn check_preconditions(&self) -> Result<(), NoSolution> {
        if self.preferences.has_require_avoid_conflict() {
            tracing::debug!(
                reject_reason = "require_avoid_conflict",
                "a ride is both required and avoided"
            );
            return Err(NoSolution);
        }
        if self.has_contradiction() {
            tracing::debug!(
                reject_reason = "capacity_contradiction",
                rides = self.rides.len(),
                periods = self.periods,
                "preferences exceed what the ride list can satisfy"
            );
            return Err(NoSolution);
        }
        Ok(())
    }

    fn solve(
        &self,
        ride_weights: &PeriodicRideWeights<'a>,
        goal: Goal<'_>,
    ) -> Result<PeriodicRideCounts<'a>, NoSolution> {
        debug_assert_eq!(ride_weights.len(), self.rides.len());
        debug_assert!(
            ride_weights
                .values()
                .all(|per_period| per_period.len() == self.periods)
        );

        let ride_count = ride_weights.len();
        let periods = self.periods;

        // One count variable per (ride, period), ride-major.
        let mut vars = variables!();
        let mut count_vars: Vec<Variable> = Vec::with_capacity(ride_count * periods);
        for _ in 0..ride_count * periods {
            count_vars.push(vars.add(variable().integer().min(0.0)));
        }

        let ridden_vars: Vec<Variable> = if self.preferences.min_distinct_rides().is_some() {
            (0..ride_count).map(|_| vars.add(variable().binary())).collect()
        } else {
            Vec::new()
        };

        let mut objective = Expression::with_capacity(count_vars.len());
        match goal {
            Goal::MaximizeRides { .. } => {
                for &count in &count_vars {
                    objective.add_mul(1.0, count);
                }
            }
            Goal::MinimizeTime { .. } => {
                for (ride_idx, per_period) in ride_weights.values().enumerate() {
                    for (period_idx, &weight) in per_period.iter().enumerate() {
                        objective.add_mul(weight as f64, count_vars[ride_idx * periods + period_idx]);
                    }
                }
            }
        }

        let mut problem = match goal {
            Goal::MaximizeRides { .. } => vars.maximise(objective),
            Goal::MinimizeTime { .. } => vars.minimise(objective),
        }
        .using(default_solver);
        #[cfg(feature = "coin_cbc")]
        {
            problem.set_parameter("log", "0");
            if let Some(limit) = self.options.time_limit_seconds {
                problem.set_parameter("seconds", &limit.to_string());
            }
        }

        match goal {
            Goal::MaximizeRides { budgets } => {
                // The budget binds within each period independently.
                for (period_idx, &budget) in budgets.iter().enumerate() {
                    let mut spent = Expression::with_capacity(ride_count);
                    for (ride_idx, per_period) in ride_weights.values().enumerate() {
                        spent.add_mul(
                            per_period[period_idx] as f64,
                            count_vars[ride_idx * periods + period_idx],
                        );
                    }
                    problem = problem.with(spent.leq(budget as f64));
                }
            }
            Goal::MinimizeTime { min_total } => {
                let mut total = Expression::with_capacity(count_vars.len());
                for &count in &count_vars {
                    total.add_mul(1.0, count);
                }
                problem = problem.with(total.geq(f64::from(min_total)));
            }
        }

        // Ride-level preferences range over each ride's sum across periods.
        for (ride_idx, &ride) in ride_weights.keys().enumerate() {
            if self.preferences.requires(ride) {
                problem = problem.with(ride_total(&count_vars, periods, ride_idx).geq(1.0));
            }
            if self.preferences.avoids(ride) {
                problem = problem.with(ride_total(&count_vars, periods, ride_idx).eq(0.0));
            }
            if let Some(repeats) = self.preferences.max_ride_repeats() {
                problem = problem
                    .with(ride_total(&count_vars, periods, ride_idx).leq(f64::from(repeats)));
            }
            if !ridden_vars.is_empty() {
                problem = problem.with(
                    (ride_total(&count_vars, periods, ride_idx) - ridden_vars[ride_idx]).geq(0.0),
                );
            }
        }

        if let Some(min_distinct) = self.preferences.min_distinct_rides() {
            let mut distinct = Expression::with_capacity(ridden_vars.len());
            for &ridden in &ridden_vars {
                distinct.add_mul(1.0, ridden);
            }
            problem = problem.with(distinct.geq(f64::from(min_distinct)));
        }

        let solution = match problem.solve() {
            Ok(solution) => solution,
            Err(status) => {
                tracing::debug!(
                    reject_reason = "solver_status",
                    status = %status,
                    rides = ride_count,
                    periods = periods,
                    "solver returned a non-optimal status"
                );
                return Err(NoSolution);
            }
        };

        let mut counts = PeriodicRideCounts::with_capacity(ride_count * periods);
        for (ride_idx, &ride) in ride_weights.keys().enumerate() {
            for period_idx in 0..periods {
                let value = solution.value(count_vars[ride_idx * periods + period_idx]);
                counts.insert((ride, period_idx + 1), round_count(value));
            }
        }
        Ok(counts)
    }
}

/// Sum of one ride's count variables across all periods.
fn ride_total(count_vars: &[Variable], periods: usize, ride_idx: usize) -> Expression {
    let mut total = Expression::with_capacity(periods);
    for period_idx in 0..periods {
        total.add_mul(1.0, count_vars[ride_idx * periods + period_idx]);
    }
    total
}
