#![warn(clippy::uninlined_format_args)]

mod constant;
mod model;
mod periodic;

use ridewise_domain::PreferenceSet;
use thiserror::Error;

pub use constant::ConstantPlanner;
pub use model::{
    PeriodicRideCounts, PeriodicRideTimes, PeriodicRideWeights, RideCounts, RideTimes,
    RideWeights, SolveOptions,
};
pub use periodic::PeriodicPlanner;

/// Uniform failure result of a solve: no optimal assignment exists, or a
/// precondition for solving is unmet. The distinct paths that lead here are
/// told apart in telemetry, never in the return value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no feasible ride assignment satisfies the active preferences")]
pub struct NoSolution;

/// Structural infeasibility that is cheap to detect analytically, before any
/// integer program is assembled.
pub(crate) fn capacity_contradiction<Budget>(
    ride_count: usize,
    preferences: &PreferenceSet<Budget>,
) -> bool {
    if let (Some(repeats), Some(min_total)) = (
        preferences.max_ride_repeats(),
        preferences.min_total_rides(),
    ) {
        // Even riding everything to the repeat cap cannot reach the floor.
        if (ride_count as u64) * u64::from(repeats) < u64::from(min_total) {
            return true;
        }
    }
    if let (Some(min_distinct), Some(avoided)) = (
        preferences.min_distinct_rides(),
        preferences.avoid_rides(),
    ) {
        // Too few non-avoided rides remain to satisfy the distinctness floor.
        if ride_count < min_distinct as usize + avoided.len() {
            return true;
        }
    }
    false
}

/// Count variables are integral in the program; the solver still hands their
/// values back as floats.
pub(crate) fn round_count(value: f64) -> u64 {
    value.round_ties_even() as u64
}

#[cfg(test)]
mod tests {
    use super::round_count;
    use rstest::rstest;

    #[rstest]
    #[case::whole(3.0, 3)]
    #[case::just_below(2.999_999_9, 3)]
    #[case::just_above(3.000_000_1, 3)]
    #[case::solver_noise_below_zero(-0.000_000_1, 0)]
    #[case::zero(0.0, 0)]
    fn count_extraction_rounds_to_nearest_integer(#[case] value: f64, #[case] expected: u64) {
        assert_eq!(round_count(value), expected);
    }
}
