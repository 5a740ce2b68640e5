use crate::mobility::error::InvalidTrajectory;
use crate::mobility::trajectory::Trajectory;
use crate::network::position::Position;
use crate::trace::mobility_step::{
    FinishStatus, MobilityStep, MobilityStepKind, PositionUpdated, TrajectoryFinished,
    TrajectoryScheduled,
};
use std::collections::HashMap;
use std::mem;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub struct VerifiedTrace {
    pub stats_by_node: HashMap<Arc<str>, NodeMobilityStats>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeMobilityStats {
    pub trajectories: u32,
    pub steps_applied: u32,
    pub distance_travelled: f64,
    pub last_position: Position,
}

#[derive(Error, Debug, PartialEq)]
pub enum InvalidTrace {
    #[error("node `{node_id}` was moved, but it has no active trajectory")]
    UnscheduledNode { node_id: Arc<str> },
    #[error("node `{node_id}` received a trajectory while the previous one was still active")]
    OverlappingTrajectories { node_id: Arc<str> },
    #[error("node `{node_id}` received an invalid trajectory")]
    InvalidTrajectory {
        node_id: Arc<str>,
        #[source]
        reason: InvalidTrajectory,
    },
    #[error("node `{node_id}` applied step {found}, but step {expected} was expected")]
    StepOutOfOrder {
        node_id: Arc<str>,
        expected: u32,
        found: u32,
    },
    #[error("node `{node_id}` applied step {step}, which its trajectory does not have")]
    ExtraStep { node_id: Arc<str>, step: u32 },
    #[error("node `{node_id}` was moved to {found} at step {step}, but {expected} was expected")]
    UnexpectedPosition {
        node_id: Arc<str>,
        step: u32,
        expected: Position,
        found: Position,
    },
    #[error(
        "node `{node_id}` applied step {step} at {} ms, before it was due at {} ms",
        .at.as_millis(),
        .due.as_millis()
    )]
    StepTooEarly {
        node_id: Arc<str>,
        step: u32,
        at: Duration,
        due: Duration,
    },
    #[error(
        "the trajectory of node `{node_id}` was still active at {} ms, after its window closed at {} ms",
        .at.as_millis(),
        .window_end.as_millis()
    )]
    ActiveAfterWindow {
        node_id: Arc<str>,
        at: Duration,
        window_end: Duration,
    },
    #[error("node `{node_id}` completed its trajectory at {found}, but {expected} was expected")]
    UnexpectedFinalPosition {
        node_id: Arc<str>,
        expected: Position,
        found: Position,
    },
    #[error(
        "the trajectory of node `{node_id}` reported {reported} applied steps, but the trace contains {traced}"
    )]
    StepCountMismatch {
        node_id: Arc<str>,
        reported: u32,
        traced: u32,
    },
}

/// Replays a mobility trace, checking that every node followed its trajectory
pub struct TraceVerifier {
    steps: Vec<MobilityStep>,
    allowed_lateness: Duration,
    nodes: HashMap<Arc<str>, ReplayedNode>,
}

impl TraceVerifier {
    /// `allowed_lateness` bounds how long after its window a trajectory may still be active, which
    /// is only non-zero when running against a real clock
    pub fn new(mut steps: Vec<MobilityStep>, allowed_lateness: Duration) -> Self {
        if !steps.is_sorted_by_key(|s| s.relative_time) {
            steps.sort_by_key(|s| s.relative_time);
        }

        Self {
            steps,
            allowed_lateness,
            nodes: HashMap::new(),
        }
    }

    pub fn verify(mut self) -> Result<VerifiedTrace, InvalidTrace> {
        let steps = mem::take(&mut self.steps);
        for step in steps {
            match &step.kind {
                MobilityStepKind::TrajectoryScheduled(s) => {
                    self.trajectory_scheduled(step.relative_time, s)?
                }
                MobilityStepKind::PositionUpdated(s) => {
                    self.position_updated(step.relative_time, s)?
                }
                MobilityStepKind::TrajectoryFinished(s) => {
                    self.trajectory_finished(step.relative_time, s)?
                }
            }
        }

        let stats_by_node = self
            .nodes
            .into_iter()
            .map(|(node_id, node)| (node_id, node.stats))
            .collect();

        Ok(VerifiedTrace { stats_by_node })
    }

    fn trajectory_scheduled(
        &mut self,
        now: Duration,
        s: &TrajectoryScheduled,
    ) -> Result<(), InvalidTrace> {
        let intervals = s
            .trajectory
            .validate()
            .map_err(|reason| InvalidTrace::InvalidTrajectory {
                node_id: s.node_id.clone(),
                reason,
            })?;

        let node = self
            .nodes
            .entry(s.node_id.clone())
            .or_insert_with(|| ReplayedNode {
                active: None,
                stats: NodeMobilityStats {
                    last_position: s.initial_position,
                    ..NodeMobilityStats::default()
                },
            });

        if node.active.is_some() {
            return Err(InvalidTrace::OverlappingTrajectories {
                node_id: s.node_id.clone(),
            });
        }

        node.stats.trajectories += 1;
        node.stats.last_position = s.initial_position;
        node.active = Some(ActiveTrajectory {
            scheduled_at: now,
            initial_position: s.initial_position,
            trajectory: s.trajectory.clone(),
            intervals,
            next_step: 0,
        });

        Ok(())
    }

    fn position_updated(&mut self, now: Duration, s: &PositionUpdated) -> Result<(), InvalidTrace> {
        let allowed_lateness = self.allowed_lateness;
        let node_id = &s.node_id;
        let node = self.active_node(node_id)?;
        let Some(active) = node.active.as_mut() else {
            return Err(InvalidTrace::UnscheduledNode {
                node_id: node_id.clone(),
            });
        };

        if s.step != active.next_step {
            return Err(InvalidTrace::StepOutOfOrder {
                node_id: node_id.clone(),
                expected: active.next_step,
                found: s.step,
            });
        }

        if s.step >= active.trajectory.applied_steps(active.intervals) {
            return Err(InvalidTrace::ExtraStep {
                node_id: node_id.clone(),
                step: s.step,
            });
        }

        let expected = active.trajectory.position_at_step(s.step, active.intervals);
        if expected != s.position {
            return Err(InvalidTrace::UnexpectedPosition {
                node_id: node_id.clone(),
                step: s.step,
                expected,
                found: s.position,
            });
        }

        let due = active.scheduled_at + active.trajectory.step_offset(s.step);
        if now < due {
            return Err(InvalidTrace::StepTooEarly {
                node_id: node_id.clone(),
                step: s.step,
                at: now,
                due,
            });
        }

        active.check_window(node_id, now, allowed_lateness)?;
        active.next_step += 1;

        node.stats.steps_applied += 1;
        node.stats.distance_travelled += node.stats.last_position.distance_to(&s.position);
        node.stats.last_position = s.position;

        Ok(())
    }

    fn trajectory_finished(
        &mut self,
        now: Duration,
        s: &TrajectoryFinished,
    ) -> Result<(), InvalidTrace> {
        let allowed_lateness = self.allowed_lateness;
        let node_id = &s.node_id;
        let node = self.active_node(node_id)?;
        let Some(active) = node.active.take() else {
            return Err(InvalidTrace::UnscheduledNode {
                node_id: node_id.clone(),
            });
        };

        if s.steps_applied != active.next_step {
            return Err(InvalidTrace::StepCountMismatch {
                node_id: node_id.clone(),
                reported: s.steps_applied,
                traced: active.next_step,
            });
        }

        // Failed and stopped trajectories end early, so only completed ones need the checks
        if s.status == FinishStatus::Completed {
            active.check_window(node_id, now, allowed_lateness)?;

            let end_offset = active.trajectory.end_offset();
            let expected = active
                .trajectory
                .position_at(end_offset, active.initial_position);
            if node.stats.last_position != expected {
                return Err(InvalidTrace::UnexpectedFinalPosition {
                    node_id: node_id.clone(),
                    expected,
                    found: node.stats.last_position,
                });
            }
        }

        Ok(())
    }

    fn active_node(&mut self, node_id: &Arc<str>) -> Result<&mut ReplayedNode, InvalidTrace> {
        self.nodes
            .get_mut(node_id)
            .ok_or_else(|| InvalidTrace::UnscheduledNode {
                node_id: node_id.clone(),
            })
    }
}

struct ReplayedNode {
    active: Option<ActiveTrajectory>,
    stats: NodeMobilityStats,
}

struct ActiveTrajectory {
    scheduled_at: Duration,
    initial_position: Position,
    trajectory: Trajectory,
    intervals: u32,
    next_step: u32,
}

impl ActiveTrajectory {
    fn check_window(
        &self,
        node_id: &Arc<str>,
        now: Duration,
        allowed_lateness: Duration,
    ) -> Result<(), InvalidTrace> {
        let window_end = self.scheduled_at + self.trajectory.end_offset();
        if now > window_end + allowed_lateness {
            return Err(InvalidTrace::ActiveAfterWindow {
                node_id: node_id.clone(),
                at: now,
                window_end,
            });
        }

        Ok(())
    }
}
