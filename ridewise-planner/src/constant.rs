use std::cell::OnceCell;

use good_lp::{Expression, Solution, SolverModel, Variable, default_solver, variable, variables};
use ridewise_domain::PreferenceSet;

use crate::model::{RideCounts, RideTimes, RideWeights, SolveOptions};
use crate::{NoSolution, capacity_contradiction, round_count};

enum Goal {
    MaximizeRides { budget: u64 },
    MinimizeTime { min_total: u32 },
}

/// Integer-program builder and solver driver for the case where every ride
/// has one fixed time cost for the whole visit.
///
/// A planner is built fresh per solve request and discarded once the caller
/// has extracted the result; the only state it keeps is the memoized weight
/// mapping.
pub struct ConstantPlanner<'a> {
    rides: Vec<RideTimes<'a>>,
    preferences: PreferenceSet,
    options: SolveOptions,
    weights: OnceCell<RideWeights<'a>>,
}

impl<'a> ConstantPlanner<'a> {
    pub fn new(
        rides: impl IntoIterator<Item = RideTimes<'a>>,
        preferences: PreferenceSet,
    ) -> Self {
        Self {
            rides: rides.into_iter().collect(),
            preferences,
            options: SolveOptions::default(),
            weights: OnceCell::new(),
        }
    }

    pub fn with_options(mut self, options: SolveOptions) -> Self {
        self.options = options;
        self
    }

    /// Total time cost per ride: wait time plus ride duration.
    ///
    /// Computed once per planner instance; repeated calls return the same
    /// mapping.
    pub fn ride_weights(&self) -> &RideWeights<'a> {
        self.weights.get_or_init(|| {
            self.rides
                .iter()
                .map(|ride| (ride.name, ride.wait_time + ride.ride_time))
                .collect()
        })
    }

    /// Whether the preferences are structurally infeasible for this ride
    /// list, without invoking the solver.
    pub fn has_contradiction(&self) -> bool {
        capacity_contradiction(self.rides.len(), &self.preferences)
    }

    /// Maximizes the total number of rides taken within the time budget.
    ///
    /// Refuses to solve (`NoSolution`) when a ride is both required and
    /// avoided, when the analytic capacity checks fail, or when no
    /// `max_time` is set: without an upper time bound the objective is
    /// unbounded.
    pub fn maximize_rides(
        &self,
        ride_weights: &RideWeights<'a>,
    ) -> Result<RideCounts<'a>, NoSolution> {
        self.check_preconditions()?;
        let Some(&budget) = self.preferences.max_time() else {
            tracing::debug!(
                reject_reason = "missing_max_time",
                rides = self.rides.len(),
                "maximize-rides without a time budget is unbounded"
            );
            return Err(NoSolution);
        };
        self.solve(ride_weights, Goal::MaximizeRides { budget })
    }

    /// Minimizes the total time spent while taking at least
    /// `min_total_rides` rides.
    ///
    /// Refuses to solve (`NoSolution`) when a ride is both required and
    /// avoided, when the analytic capacity checks fail, or when no
    /// `min_total_rides` is set: without a floor the all-zero assignment is
    /// a degenerate non-answer.
    pub fn minimize_time(
        &self,
        ride_weights: &RideWeights<'a>,
    ) -> Result<RideCounts<'a>, NoSolution> {
        self.check_preconditions()?;
        let Some(min_total) = self.preferences.min_total_rides() else {
            tracing::debug!(
                reject_reason = "missing_min_total_rides",
                rides = self.rides.len(),
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
                "preferences exceed what the ride list can satisfy"
            );
            return Err(NoSolution);
        }
        Ok(())
    }

    fn solve(
        &self,
        ride_weights: &RideWeights<'a>,
        goal: Goal,
    ) -> Result<RideCounts<'a>, NoSolution> {
        debug_assert_eq!(ride_weights.len(), self.rides.len());

        let mut vars = variables!();

        let mut count_vars: Vec<Variable> = Vec::with_capacity(ride_weights.len());
        for _ in 0..ride_weights.len() {
            let mut count = variable().integer().min(0.0);
            if let Some(repeats) = self.preferences.max_ride_repeats() {
                count = count.max(f64::from(repeats));
            }
            count_vars.push(vars.add(count));
        }

        // Per-ride "was it ridden at all" indicators, only when the
        // distinctness floor needs them.
        let ridden_vars: Vec<Variable> = if self.preferences.min_distinct_rides().is_some() {
            (0..ride_weights.len())
                .map(|_| vars.add(variable().binary()))
                .collect()
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
                for (&count, &weight) in count_vars.iter().zip(ride_weights.values()) {
                    objective.add_mul(weight as f64, count);
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
            Goal::MaximizeRides { budget } => {
                let mut spent = Expression::with_capacity(count_vars.len());
                for (&count, &weight) in count_vars.iter().zip(ride_weights.values()) {
                    spent.add_mul(weight as f64, count);
                }
                problem = problem.with(spent.leq(budget as f64));
            }
            Goal::MinimizeTime { min_total } => {
                let mut total = Expression::with_capacity(count_vars.len());
                for &count in &count_vars {
                    total.add_mul(1.0, count);
                }
                problem = problem.with(total.geq(f64::from(min_total)));
            }
        }

        for (idx, &ride) in ride_weights.keys().enumerate() {
            if self.preferences.requires(ride) {
                problem = problem.with((count_vars[idx] - 1.0).geq(0.0));
            }
            if self.preferences.avoids(ride) {
                problem = problem.with((count_vars[idx] - 0.0).eq(0.0));
            }
            // Raising an indicator forces its count to at least 1, so the
            // distinctness floor can only be met by rides actually ridden.
            if !ridden_vars.is_empty() {
                problem = problem.with((count_vars[idx] - ridden_vars[idx]).geq(0.0));
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
                    rides = ride_weights.len(),
                    "solver returned a non-optimal status"
                );
                return Err(NoSolution);
            }
        };

        Ok(ride_weights
            .keys()
            .zip(&count_vars)
            .map(|(&ride, &count)| (ride, round_count(solution.value(count))))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use ridewise_domain::RidePreferences;
    use rstest::rstest;

    fn rides() -> Vec<RideTimes<'static>> {
        vec![
            RideTimes { name: "a", wait_time: 2, ride_time: 5 },
            RideTimes { name: "b", wait_time: 4, ride_time: 2 },
            RideTimes { name: "c", wait_time: 6, ride_time: 4 },
        ]
    }

    fn planner(preferences: RidePreferences) -> ConstantPlanner<'static> {
        ConstantPlanner::new(rides(), preferences.normalized())
    }

    fn names(list: &[&str]) -> Option<Vec<String>> {
        Some(list.iter().map(|ride| (*ride).to_owned()).collect())
    }

    fn total_rides(counts: &RideCounts<'_>) -> u64 {
        counts.values().sum()
    }

    fn total_cost(counts: &RideCounts<'_>, weights: &RideWeights<'_>) -> u64 {
        counts
            .iter()
            .map(|(ride, count)| count * weights[ride])
            .sum()
    }

    #[test]
    fn ride_weights_sum_wait_and_ride_time() {
        let park = planner(RidePreferences::default());
        let weights = park.ride_weights();
        assert_eq!(weights["a"], 7);
        assert_eq!(weights["b"], 6);
        assert_eq!(weights["c"], 10);
    }

    #[test]
    fn ride_weights_are_idempotent() {
        let park = planner(RidePreferences::default());
        assert_eq!(park.ride_weights().clone(), *park.ride_weights());
    }

    #[test]
    fn maximize_fills_the_time_budget() {
        let park = planner(RidePreferences {
            max_time: Some(20),
            ..RidePreferences::default()
        });
        let weights = park.ride_weights();

        let counts = park.maximize_rides(weights).expect("expected solution");

        // Three b's (18 of 20) tie with e.g. two a's and a b; the count is
        // what the objective pins down.
        assert_eq!(total_rides(&counts), 3);
        assert!(total_cost(&counts, weights) <= 20);
    }

    #[test]
    fn solver_time_limit_is_configurable() {
        let park = planner(RidePreferences {
            max_time: Some(20),
            ..RidePreferences::default()
        })
        .with_options(SolveOptions {
            time_limit_seconds: Some(10.0),
        });
        let weights = park.ride_weights();

        let counts = park.maximize_rides(weights).expect("expected solution");

        assert_eq!(total_rides(&counts), 3);
    }

    #[test]
    fn maximize_without_time_budget_is_refused() {
        let park = planner(RidePreferences::default());
        let weights = park.ride_weights();

        assert_eq!(park.maximize_rides(weights), Err(NoSolution));
    }

    #[test]
    fn maximize_with_unbounded_repeats_rides_the_cheapest_ride() {
        let park = planner(RidePreferences {
            max_time: Some(30),
            ..RidePreferences::default()
        });
        let weights = park.ride_weights();

        let counts = park.maximize_rides(weights).expect("expected solution");

        // Five rides cost at least 30, which only five b's fit exactly.
        assert_eq!(counts["a"], 0);
        assert_eq!(counts["b"], 5);
        assert_eq!(counts["c"], 0);
    }

    #[test]
    fn maximize_respects_the_repeat_cap() {
        let park = planner(RidePreferences {
            max_ride_repeats: Some(2),
            max_time: Some(30),
            ..RidePreferences::default()
        });
        let weights = park.ride_weights();

        let counts = park.maximize_rides(weights).expect("expected solution");

        assert_eq!(total_rides(&counts), 4);
        assert!(counts.values().all(|&count| count <= 2));
        assert!(total_cost(&counts, weights) <= 30);
    }

    #[test]
    fn maximize_honors_required_rides() {
        let park = planner(RidePreferences {
            required_rides: names(&["a"]),
            max_time: Some(30),
            ..RidePreferences::default()
        });
        let weights = park.ride_weights();

        let counts = park.maximize_rides(weights).expect("expected solution");

        assert!(counts["a"] >= 1);
        assert_eq!(total_rides(&counts), 4);
        assert!(total_cost(&counts, weights) <= 30);
    }

    #[test]
    fn maximize_honors_avoided_rides() {
        let park = planner(RidePreferences {
            avoid_rides: names(&["b"]),
            max_time: Some(30),
            ..RidePreferences::default()
        });
        let weights = park.ride_weights();

        let counts = park.maximize_rides(weights).expect("expected solution");

        // Four a's (28) are the only four rides that fit without b.
        assert_eq!(counts["a"], 4);
        assert_eq!(counts["b"], 0);
        assert_eq!(counts["c"], 0);
    }

    #[test]
    fn maximize_honors_the_distinctness_floor() {
        let park = planner(RidePreferences {
            min_distinct_rides: Some(3),
            max_time: Some(30),
            ..RidePreferences::default()
        });
        let weights = park.ride_weights();

        let counts = park.maximize_rides(weights).expect("expected solution");

        // One of each costs 23; the 7 left over fit exactly one more b.
        assert_eq!(counts["a"], 1);
        assert_eq!(counts["b"], 2);
        assert_eq!(counts["c"], 1);
    }

    #[test]
    fn maximize_with_zero_budget_rides_nothing() {
        let park = planner(RidePreferences {
            max_time: Some(0),
            ..RidePreferences::default()
        });
        let weights = park.ride_weights();

        let counts = park.maximize_rides(weights).expect("expected solution");

        assert!(counts.values().all(|&count| count == 0));
        assert_eq!(counts.len(), 3);
    }

    #[test]
    fn minimize_repeats_the_cheapest_ride_to_the_floor() {
        let park = planner(RidePreferences {
            min_total_rides: Some(10),
            ..RidePreferences::default()
        });
        let weights = park.ride_weights();

        let counts = park.minimize_time(weights).expect("expected solution");

        assert_eq!(counts["a"], 0);
        assert_eq!(counts["b"], 10);
        assert_eq!(counts["c"], 0);
    }

    #[test]
    fn minimize_without_ride_floor_is_refused() {
        let park = planner(RidePreferences::default());
        let weights = park.ride_weights();

        assert_eq!(park.minimize_time(weights), Err(NoSolution));
    }

    #[test]
    fn minimize_with_zero_floor_rides_nothing() {
        let park = planner(RidePreferences {
            min_total_rides: Some(0),
            ..RidePreferences::default()
        });
        let weights = park.ride_weights();

        let counts = park.minimize_time(weights).expect("expected solution");

        assert!(counts.values().all(|&count| count == 0));
    }

    #[test]
    fn minimize_combines_required_avoid_and_floor() {
        let park = planner(RidePreferences {
            required_rides: names(&["a", "c"]),
            avoid_rides: names(&["b"]),
            min_total_rides: Some(10),
            ..RidePreferences::default()
        });
        let weights = park.ride_weights();

        let counts = park.minimize_time(weights).expect("expected solution");

        // Nine a's and the one mandatory c are the cheapest ten without b.
        assert_eq!(counts["a"], 9);
        assert_eq!(counts["b"], 0);
        assert_eq!(counts["c"], 1);
    }

    #[rstest]
    #[case::maximize(RidePreferences {
        required_rides: names(&["a"]),
        avoid_rides: names(&["a"]),
        max_time: Some(30),
        ..RidePreferences::default()
    })]
    #[case::minimize(RidePreferences {
        required_rides: names(&["a"]),
        avoid_rides: names(&["a"]),
        min_total_rides: Some(3),
        ..RidePreferences::default()
    })]
    fn requiring_and_avoiding_the_same_ride_is_refused(#[case] preferences: RidePreferences) {
        let park = planner(preferences);
        let weights = park.ride_weights();

        assert_eq!(park.maximize_rides(weights), Err(NoSolution));
        assert_eq!(park.minimize_time(weights), Err(NoSolution));
    }

    #[rstest]
    #[case::repeat_capacity(RidePreferences {
        max_ride_repeats: Some(2),
        min_total_rides: Some(10),
        ..RidePreferences::default()
    }, true)]
    #[case::distinctness_capacity(RidePreferences {
        min_distinct_rides: Some(3),
        avoid_rides: names(&["b"]),
        ..RidePreferences::default()
    }, true)]
    #[case::repeat_capacity_exact_fit(RidePreferences {
        max_ride_repeats: Some(4),
        min_total_rides: Some(12),
        ..RidePreferences::default()
    }, false)]
    #[case::distinctness_exact_fit(RidePreferences {
        min_distinct_rides: Some(2),
        avoid_rides: names(&["b"]),
        ..RidePreferences::default()
    }, false)]
    fn capacity_contradictions_are_detected_analytically(
        #[case] preferences: RidePreferences,
        #[case] expected: bool,
    ) {
        let park = planner(preferences);

        assert_eq!(park.has_contradiction(), expected);
    }

    #[test]
    fn contradictory_preferences_are_refused_before_solving() {
        let park = planner(RidePreferences {
            required_rides: names(&["a", "c"]),
            avoid_rides: names(&["b"]),
            max_ride_repeats: Some(2),
            min_total_rides: Some(10),
            ..RidePreferences::default()
        });
        let weights = park.ride_weights();

        assert!(park.has_contradiction());
        assert_eq!(park.minimize_time(weights), Err(NoSolution));
        assert_eq!(park.maximize_rides(weights), Err(NoSolution));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn maximize_solutions_satisfy_every_active_constraint(
            wait_times in prop::collection::vec(1u64..12, 2..5),
            max_time in 10u64..60,
            max_ride_repeats in prop::option::of(1u32..5),
            require_first in any::<bool>(),
            avoid_last in any::<bool>(),
        ) {
            let names: Vec<String> = (0..wait_times.len())
                .map(|idx| format!("ride_{idx}"))
                .collect();
            let ride_list: Vec<RideTimes<'_>> = names
                .iter()
                .zip(&wait_times)
                .map(|(name, &wait_time)| RideTimes {
                    name: name.as_str(),
                    wait_time,
                    ride_time: 1,
                })
                .collect();

            let preferences = RidePreferences {
                required_rides: require_first.then(|| vec![names[0].clone()]),
                avoid_rides: avoid_last.then(|| vec![names[names.len() - 1].clone()]),
                max_ride_repeats,
                max_time: Some(max_time),
                ..RidePreferences::default()
            };
            let park = ConstantPlanner::new(ride_list, preferences.normalized());
            let weights = park.ride_weights();

            if let Ok(counts) = park.maximize_rides(weights) {
                prop_assert_eq!(counts.len(), names.len());
                prop_assert!(total_cost(&counts, weights) <= max_time);
                if let Some(repeats) = max_ride_repeats {
                    prop_assert!(counts.values().all(|&count| count <= u64::from(repeats)));
                }
                if require_first {
                    prop_assert!(counts[names[0].as_str()] >= 1);
                }
                if avoid_last {
                    prop_assert_eq!(counts[names[names.len() - 1].as_str()], 0);
                }
            } else {
                // Only a required ride that does not fit the budget can make
                // this program infeasible; otherwise all-zero is a solution.
                prop_assert!(
                    require_first && weights[names[0].as_str()] > max_time,
                    "expected a feasible assignment"
                );
            }
        }

        #[test]
        fn minimize_solutions_meet_the_floor_at_minimal_cost_bound(
            wait_times in prop::collection::vec(1u64..12, 2..5),
            min_total_rides in 1u32..8,
        ) {
            let names: Vec<String> = (0..wait_times.len())
                .map(|idx| format!("ride_{idx}"))
                .collect();
            let ride_list: Vec<RideTimes<'_>> = names
                .iter()
                .zip(&wait_times)
                .map(|(name, &wait_time)| RideTimes {
                    name: name.as_str(),
                    wait_time,
                    ride_time: 2,
                })
                .collect();

            let preferences = RidePreferences {
                min_total_rides: Some(min_total_rides),
                ..RidePreferences::default()
            };
            let park = ConstantPlanner::new(ride_list, preferences.normalized());
            let weights = park.ride_weights();

            let counts = park.minimize_time(weights).expect("floor alone is satisfiable");
            prop_assert_eq!(total_rides(&counts), u64::from(min_total_rides));

            let cheapest = weights.values().copied().min().expect("non-empty");
            prop_assert_eq!(
                total_cost(&counts, weights),
                cheapest * u64::from(min_total_rides)
            );
        }
    }
}
