use ridewise_planner::NoSolution;
use thiserror::Error;

/// Planning failures in the application's vocabulary. The output collaborator
/// is expected to turn these into user-facing prose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlanningError {
    #[error("no feasible plan satisfies the active preferences")]
    NoFeasiblePlan,
}

impl From<NoSolution> for PlanningError {
    fn from(_: NoSolution) -> Self {
        PlanningError::NoFeasiblePlan
    }
}
