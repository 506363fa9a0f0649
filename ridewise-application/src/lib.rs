#![warn(clippy::uninlined_format_args)]

pub mod error;
pub mod model;
pub mod ports;
pub mod service;
pub mod snapshot;

pub use error::PlanningError;
pub use model::{
    ConstantRideTable, PeriodicRideTable, PlanObjective, PlanOutcome, PlanRequest,
};
pub use ports::{PlanConsumer, RideDataSource};
pub use service::PlanService;
pub use snapshot::{RideStatus, active_rides};
