use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MobilityError {
    #[error("node `{node_id}` does not exist")]
    UnknownNode { node_id: Arc<str> },
    #[error("node `{node_id}` already has an active trajectory")]
    AlreadyScheduled { node_id: Arc<str> },
    #[error("invalid trajectory for node `{node_id}`")]
    InvalidTrajectory {
        node_id: Arc<str>,
        #[source]
        reason: InvalidTrajectory,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidTrajectory {
    #[error("the trajectory has a duration of zero")]
    ZeroDuration,
    #[error("the trajectory has a step interval of zero")]
    ZeroStepInterval,
    #[error("the start or end point has a non-finite coordinate")]
    NonFinitePosition,
    #[error(
        "the duration ({} ms) is not a multiple of the step interval ({} ms)",
        .duration.as_millis(),
        .step_interval.as_millis()
    )]
    UnevenSteps {
        duration: Duration,
        step_interval: Duration,
    },
    #[error("the trajectory has too many steps")]
    TooManySteps,
}

/// Why a running trajectory gave up before completing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrajectoryFailure {
    #[error("node `{node_id}` disappeared before step {step}")]
    NodeMissing { node_id: Arc<str>, step: u32 },
    #[error("failed to move node `{node_id}` at step {step}, even after retrying: {reason}")]
    SetPositionFailed {
        node_id: Arc<str>,
        step: u32,
        reason: String,
    },
    #[error("the trajectory task for node `{node_id}` crashed")]
    Crashed { node_id: Arc<str> },
}
