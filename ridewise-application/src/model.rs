use indexmap::IndexMap;
use ridewise_domain::RidePreferences;
use serde::{Deserialize, Serialize};

/// Ride table with one fixed wait and ride time per attraction, in minutes.
/// The numeric columns are parallel to `rides`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantRideTable {
    pub rides: Vec<String>,
    pub wait_times: Vec<u64>,
    pub ride_times: Vec<u64>,
}

/// Ride table with one wait and ride time column per period. The outer index
/// of the numeric tables is the period (index 0 is period 1); each inner row
/// is parallel to `rides`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodicRideTable {
    pub rides: Vec<String>,
    pub periods: usize,
    pub wait_times: Vec<Vec<u64>>,
    pub ride_times: Vec<Vec<u64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanObjective {
    /// Take as many rides as possible within the time budget.
    MaximizeRides,
    /// Spend as little time as possible while meeting the ride floor.
    MinimizeTime,
}

/// One fully-populated plan request, as supplied by the input collaborator.
/// Preferences arrive raw; normalization happens inside the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanRequest {
    Constant {
        table: ConstantRideTable,
        preferences: RidePreferences,
        objective: PlanObjective,
    },
    Periodic {
        table: PeriodicRideTable,
        preferences: RidePreferences<Vec<u64>>,
        objective: PlanObjective,
    },
}

/// Owned optimal assignment handed to the output collaborator, covering
/// every ride (and period) with explicit zeros.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanOutcome {
    Constant(IndexMap<String, u64>),
    Periodic(IndexMap<(String, usize), u64>),
}
