use crate::network::position::Position;
use crate::trace::mobility_step::{MobilityStep, MobilityStepKind};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq)]
pub struct TimelineEntry {
    pub relative_time: Duration,
    pub node_id: Arc<str>,
    pub step: u32,
    pub position: Position,
}

#[derive(Clone, Default)]
pub struct MobilityStepper {
    steps: Vec<MobilityStep>,
}

impl MobilityStepper {
    pub fn new(steps: Vec<MobilityStep>) -> Self {
        Self { steps }
    }

    pub fn steps(self) -> Vec<MobilityStep> {
        self.steps
    }

    /// Every position update, ordered by time and then by node id
    pub fn timeline(&self) -> Vec<TimelineEntry> {
        let mut timeline: Vec<_> = self
            .steps
            .iter()
            .filter_map(|s| match &s.kind {
                MobilityStepKind::PositionUpdated(update) => Some(TimelineEntry {
                    relative_time: s.relative_time,
                    node_id: update.node_id.clone(),
                    step: update.step,
                    position: update.position,
                }),
                _ => None,
            })
            .collect();

        // Stable sort, so steps of the same node keep their recorded order
        timeline.sort_by(|e1, e2| {
            e1.relative_time
                .cmp(&e2.relative_time)
                .then_with(|| e1.node_id.cmp(&e2.node_id))
        });
        timeline
    }

    pub fn position_updates(&self, node_id: &str) -> Vec<(Duration, Position)> {
        self.steps
            .iter()
            .filter_map(|s| match &s.kind {
                MobilityStepKind::PositionUpdated(update) if update.node_id.as_ref() == node_id => {
                    Some((s.relative_time, update.position))
                }
                _ => None,
            })
            .collect()
    }
}
