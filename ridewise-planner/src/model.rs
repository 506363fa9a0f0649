use indexmap::IndexMap;

/// One attraction's time costs, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RideTimes<'a> {
    pub name: &'a str,
    /// Expected queue time per ride.
    pub wait_time: u64,
    /// Active ride duration.
    pub ride_time: u64,
}

/// One attraction's time costs per period; index 0 is period 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodicRideTimes<'a> {
    pub name: &'a str,
    pub wait_times: Vec<u64>,
    pub ride_times: Vec<u64>,
}

/// Total time cost (wait plus ride) per attraction, in ride-list order.
pub type RideWeights<'a> = IndexMap<&'a str, u64>;

/// Optimal ride count per attraction, with explicit zeros.
pub type RideCounts<'a> = IndexMap<&'a str, u64>;

/// Total time cost per attraction and period; the inner index 0 is period 1.
pub type PeriodicRideWeights<'a> = IndexMap<&'a str, Vec<u64>>;

/// Optimal ride count per (attraction, period) pair, ride-major, with
/// 1-based period indices and explicit zeros.
pub type PeriodicRideCounts<'a> = IndexMap<(&'a str, usize), u64>;

/// Solver tuning. The default runs the backend to its own optimality or
/// infeasibility determination.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SolveOptions {
    pub time_limit_seconds: Option<f64>,
}
