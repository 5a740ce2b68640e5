use crate::mobility::trajectory::Trajectory;
use crate::network::position::Position;
use serde::{Deserialize, Serialize};
use serde_with::{DurationNanoSeconds, serde_as};
use std::sync::Arc;
use std::time::Duration;

#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MobilityStep {
    #[serde_as(as = "DurationNanoSeconds")]
    #[serde(rename = "relative_time_ns")]
    pub relative_time: Duration,
    #[serde(flatten)]
    pub kind: MobilityStepKind,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "data")]
pub enum MobilityStepKind {
    /// A trajectory was attached to a node
    TrajectoryScheduled(TrajectoryScheduled),
    /// The node was moved to a new position
    PositionUpdated(PositionUpdated),
    /// The trajectory will not move its node anymore
    TrajectoryFinished(TrajectoryFinished),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrajectoryScheduled {
    pub node_id: Arc<str>,
    pub initial_position: Position,
    pub trajectory: Trajectory,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PositionUpdated {
    pub node_id: Arc<str>,
    pub step: u32,
    pub position: Position,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrajectoryFinished {
    pub node_id: Arc<str>,
    pub steps_applied: u32,
    pub status: FinishStatus,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FinishStatus {
    Completed,
    Stopped,
    Failed,
}
