use ridewise_planner::{
    ConstantPlanner, PeriodicPlanner, PeriodicRideTimes, RideTimes, SolveOptions,
};

use crate::error::PlanningError;
use crate::model::{PlanObjective, PlanOutcome, PlanRequest};
use crate::ports::{PlanConsumer, RideDataSource};

/// Runs one plan request end to end: normalize the raw preferences, build
/// the matching planner, solve for the requested objective, and hand the
/// owned outcome to the output collaborator.
#[derive(Clone, Copy)]
pub struct PlanService<'a> {
    consumer: &'a dyn PlanConsumer,
    options: SolveOptions,
}

impl<'a> PlanService<'a> {
    pub fn new(consumer: &'a dyn PlanConsumer) -> Self {
        Self {
            consumer,
            options: SolveOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SolveOptions) -> Self {
        self.options = options;
        self
    }

    /// Pulls the next request from the input collaborator and reports the
    /// result to the output collaborator.
    pub fn run(&self, source: &dyn RideDataSource) -> Result<PlanOutcome, PlanningError> {
        match self.plan(source.plan_request()) {
            Ok(outcome) => {
                self.consumer.plan_ready(&outcome);
                Ok(outcome)
            }
            Err(err) => {
                self.consumer.no_feasible_plan();
                Err(err)
            }
        }
    }

    /// Solves one request without involving the collaborators.
    pub fn plan(&self, request: PlanRequest) -> Result<PlanOutcome, PlanningError> {
        match request {
            PlanRequest::Constant {
                table,
                preferences,
                objective,
            } => {
                debug_assert_eq!(table.rides.len(), table.wait_times.len());
                debug_assert_eq!(table.rides.len(), table.ride_times.len());
                tracing::debug!(
                    objective = ?objective,
                    rides = table.rides.len(),
                    "planning with constant ride costs"
                );

                let rows = table
                    .rides
                    .iter()
                    .zip(&table.wait_times)
                    .zip(&table.ride_times)
                    .map(|((name, &wait_time), &ride_time)| RideTimes {
                        name: name.as_str(),
                        wait_time,
                        ride_time,
                    });
                let planner = ConstantPlanner::new(rows, preferences.normalized())
                    .with_options(self.options);
                let weights = planner.ride_weights();
                let counts = match objective {
                    PlanObjective::MaximizeRides => planner.maximize_rides(weights),
                    PlanObjective::MinimizeTime => planner.minimize_time(weights),
                }?;
                Ok(PlanOutcome::Constant(
                    counts
                        .iter()
                        .map(|(&ride, &count)| (ride.to_owned(), count))
                        .collect(),
                ))
            }
            PlanRequest::Periodic {
                table,
                preferences,
                objective,
            } => {
                debug_assert_eq!(table.wait_times.len(), table.periods);
                debug_assert_eq!(table.ride_times.len(), table.periods);
                debug_assert!(
                    table
                        .wait_times
                        .iter()
                        .chain(&table.ride_times)
                        .all(|row| row.len() == table.rides.len())
                );
                tracing::debug!(
                    objective = ?objective,
                    rides = table.rides.len(),
                    periods = table.periods,
                    "planning with periodic ride costs"
                );

                // The collaborator supplies period-major tables; the planner
                // consumes one row per ride.
                let rows = table.rides.iter().enumerate().map(|(idx, name)| {
                    PeriodicRideTimes {
                        name: name.as_str(),
                        wait_times: table.wait_times.iter().map(|row| row[idx]).collect(),
                        ride_times: table.ride_times.iter().map(|row| row[idx]).collect(),
                    }
                });
                let planner = PeriodicPlanner::new(table.periods, rows, preferences.normalized())
                    .with_options(self.options);
                let weights = planner.ride_weights();
                let counts = match objective {
                    PlanObjective::MaximizeRides => planner.maximize_rides(weights),
                    PlanObjective::MinimizeTime => planner.minimize_time(weights),
                }?;
                Ok(PlanOutcome::Periodic(
                    counts
                        .iter()
                        .map(|(&(ride, period), &count)| ((ride.to_owned(), period), count))
                        .collect(),
                ))
            }
        }
    }
}
