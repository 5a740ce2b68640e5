use crate::mobility::error::InvalidTrajectory;
use crate::network::position::Position;
use serde::{Deserialize, Serialize};
use serde_with::{DurationNanoSeconds, serde_as};
use std::time::Duration;

pub const DEFAULT_STEP_INTERVAL: Duration = Duration::from_secs(1);

/// Whether the last applied step of a trajectory lands on its end point
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Arrival {
    /// An extra step at the end of the window sets the end point exactly
    #[default]
    Exact,
    /// Stop after `duration / step_interval` steps, one step short of the end point
    StopShort,
}

/// A linear path from `start` to `end`, followed over `duration` once `start_delay` has elapsed
#[serde_as]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    #[serde_as(as = "DurationNanoSeconds")]
    #[serde(rename = "start_delay_ns")]
    pub start_delay: Duration,
    #[serde_as(as = "DurationNanoSeconds")]
    #[serde(rename = "duration_ns")]
    pub duration: Duration,
    #[serde_as(as = "DurationNanoSeconds")]
    #[serde(rename = "step_interval_ns")]
    pub step_interval: Duration,
    pub start: Position,
    pub end: Position,
    pub arrival: Arrival,
}

impl Trajectory {
    pub fn linear(
        start: Position,
        end: Position,
        start_delay: Duration,
        duration: Duration,
    ) -> Self {
        Self {
            start_delay,
            duration,
            step_interval: DEFAULT_STEP_INTERVAL,
            start,
            end,
            arrival: Arrival::default(),
        }
    }

    pub fn with_step_interval(mut self, step_interval: Duration) -> Self {
        self.step_interval = step_interval;
        self
    }

    pub fn with_arrival(mut self, arrival: Arrival) -> Self {
        self.arrival = arrival;
        self
    }

    /// Checks the trajectory can be executed and returns the number of interpolation intervals
    pub fn validate(&self) -> Result<u32, InvalidTrajectory> {
        if self.duration.is_zero() {
            return Err(InvalidTrajectory::ZeroDuration);
        }
        if self.step_interval.is_zero() {
            return Err(InvalidTrajectory::ZeroStepInterval);
        }
        if !self.start.is_finite() || !self.end.is_finite() {
            return Err(InvalidTrajectory::NonFinitePosition);
        }

        let duration = self.duration.as_nanos();
        let step_interval = self.step_interval.as_nanos();
        if duration % step_interval != 0 {
            return Err(InvalidTrajectory::UnevenSteps {
                duration: self.duration,
                step_interval: self.step_interval,
            });
        }

        // One extra step is needed for exact arrival
        match u32::try_from(duration / step_interval) {
            Ok(intervals) if intervals < u32::MAX => Ok(intervals),
            _ => Err(InvalidTrajectory::TooManySteps),
        }
    }

    /// Number of position updates the trajectory will apply, given its interval count
    pub fn applied_steps(&self, intervals: u32) -> u32 {
        match self.arrival {
            Arrival::Exact => intervals + 1,
            Arrival::StopShort => intervals,
        }
    }

    /// The position applied at `step` (0-based)
    pub fn position_at_step(&self, step: u32, intervals: u32) -> Position {
        if step >= intervals {
            self.end
        } else {
            self.start.interpolate(self.end, step, intervals)
        }
    }

    /// Offset of `step` relative to the moment the trajectory was scheduled
    pub fn step_offset(&self, step: u32) -> Duration {
        self.start_delay + self.step_interval * step
    }

    /// Offset of the end of the motion window relative to the moment the trajectory was scheduled
    pub fn end_offset(&self) -> Duration {
        self.start_delay + self.duration
    }

    /// Where the node should be `elapsed` after scheduling, given where it was before moving
    pub fn position_at(&self, elapsed: Duration, initial: Position) -> Position {
        let Ok(intervals) = self.validate() else {
            return initial;
        };

        if elapsed < self.start_delay {
            return initial;
        }

        let since_start = elapsed - self.start_delay;
        let completed = (since_start.as_nanos() / self.step_interval.as_nanos())
            .min(intervals as u128) as u32;
        let last_step = completed.min(self.applied_steps(intervals) - 1);
        self.position_at_step(last_step, intervals)
    }
}
