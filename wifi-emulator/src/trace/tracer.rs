use crate::mobility::TrajectoryOutcome;
use crate::mobility::trajectory::Trajectory;
use crate::network::position::Position;
use crate::trace::mobility_step::{
    FinishStatus, MobilityStep, MobilityStepKind, PositionUpdated, TrajectoryFinished,
    TrajectoryScheduled,
};
use crate::trace::stepper::MobilityStepper;
use crate::trace::verifier::TraceVerifier;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Records everything the mobility scheduler does, relative to the start of the run
pub struct MobilityTracer {
    simulation_start: Instant,
    recorded_steps: Mutex<Vec<MobilityStep>>,
}

impl MobilityTracer {
    pub fn new() -> Self {
        Self {
            simulation_start: Instant::now(),
            recorded_steps: Default::default(),
        }
    }

    pub fn simulation_start(&self) -> Instant {
        self.simulation_start
    }

    pub fn elapsed(&self) -> Duration {
        self.simulation_start.elapsed()
    }

    pub fn stepper(&self) -> MobilityStepper {
        MobilityStepper::new(self.recorded_steps.lock().clone())
    }

    pub fn verifier(&self, allowed_lateness: Duration) -> TraceVerifier {
        TraceVerifier::new(self.recorded_steps.lock().clone(), allowed_lateness)
    }

    fn record(&self, kind: MobilityStepKind) {
        self.record_at(Instant::now(), kind);
    }

    fn record_at(&self, at: Instant, kind: MobilityStepKind) {
        let mut steps = self.recorded_steps.lock();
        steps.push(MobilityStep {
            relative_time: at.saturating_duration_since(self.simulation_start),
            kind,
        });
    }

    /// Records the trajectory at `baseline`, the instant its step deadlines are relative to
    pub fn track_trajectory_scheduled(
        &self,
        node_id: &Arc<str>,
        initial_position: Position,
        baseline: Instant,
        trajectory: &Trajectory,
    ) {
        tracing::info!(
            node = %node_id,
            from = %trajectory.start,
            to = %trajectory.end,
            start_delay_ms = trajectory.start_delay.as_millis() as u64,
            duration_ms = trajectory.duration.as_millis() as u64,
            "trajectory scheduled"
        );

        self.record_at(
            baseline,
            MobilityStepKind::TrajectoryScheduled(TrajectoryScheduled {
                node_id: node_id.clone(),
                initial_position,
                trajectory: trajectory.clone(),
            }),
        );
    }

    pub fn track_position_updated(&self, node_id: &Arc<str>, step: u32, position: Position) {
        tracing::debug!(node = %node_id, step, position = %position, "position updated");

        self.record(MobilityStepKind::PositionUpdated(PositionUpdated {
            node_id: node_id.clone(),
            step,
            position,
        }));
    }

    pub fn track_trajectory_finished(
        &self,
        node_id: &Arc<str>,
        steps_applied: u32,
        outcome: &TrajectoryOutcome,
    ) {
        let (status, error) = match outcome {
            TrajectoryOutcome::Completed => {
                tracing::info!(node = %node_id, steps_applied, "trajectory completed");
                (FinishStatus::Completed, None)
            }
            TrajectoryOutcome::Stopped => {
                tracing::info!(node = %node_id, steps_applied, "trajectory stopped");
                (FinishStatus::Stopped, None)
            }
            TrajectoryOutcome::Failed(failure) => {
                tracing::warn!(node = %node_id, steps_applied, error = %failure, "trajectory failed");
                (FinishStatus::Failed, Some(failure.to_string()))
            }
        };

        self.record(MobilityStepKind::TrajectoryFinished(TrajectoryFinished {
            node_id: node_id.clone(),
            steps_applied,
            status,
            error,
        }));
    }
}

impl Default for MobilityTracer {
    fn default() -> Self {
        Self::new()
    }
}
