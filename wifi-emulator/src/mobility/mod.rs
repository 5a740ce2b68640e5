//! Time-scheduled mobility
//!
//! Every scheduled trajectory runs as its own task, with its own step counter and its own time
//! baseline, so trajectories never delay each other. Steps are applied at absolute deadlines
//! (`baseline + start_delay + k * step_interval`), which keeps the per-step work from accumulating
//! drift. Callers wait for all trajectories through [`MobilityScheduler::join`].

pub mod error;
pub mod trajectory;

use crate::async_rt;
use crate::async_rt::cancellation::{CancellationSignal, CancellationToken};
use crate::async_rt::time::Instant;
use crate::mobility::error::{MobilityError, TrajectoryFailure};
use crate::mobility::trajectory::Trajectory;
use crate::network::WirelessNetwork;
use crate::network::node::{MobileNode, SetPositionError};
use crate::network::position::Position;
use crate::trace::tracer::MobilityTracer;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{self, AtomicU32};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq)]
pub enum TrajectoryOutcome {
    /// Every step was applied and the motion window elapsed
    Completed,
    /// The scheduler was asked to stop before the trajectory finished
    Stopped,
    Failed(TrajectoryFailure),
}

#[derive(Clone, Debug)]
pub struct TrajectoryReport {
    pub node_id: Arc<str>,
    pub steps_applied: u32,
    pub outcome: TrajectoryOutcome,
    /// Relative to the start of the tracer
    pub finished_at: Duration,
}

#[derive(Clone, Debug)]
pub struct MobilityReport {
    /// One entry per trajectory, in scheduling order
    pub trajectories: Vec<TrajectoryReport>,
}

impl MobilityReport {
    pub fn all_completed(&self) -> bool {
        self.trajectories
            .iter()
            .all(|t| t.outcome == TrajectoryOutcome::Completed)
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Arc<str>, &TrajectoryFailure)> {
        self.trajectories.iter().filter_map(|t| match &t.outcome {
            TrajectoryOutcome::Failed(failure) => Some((&t.node_id, failure)),
            _ => None,
        })
    }
}

pub struct MobilityScheduler {
    tracer: Arc<MobilityTracer>,
    active_nodes: Arc<Mutex<HashSet<Arc<str>>>>,
    scheduled: Vec<ScheduledTrajectory>,
    stop_token: CancellationToken,
    stop_signal: CancellationSignal,
    deadline: Option<Instant>,
}

struct ScheduledTrajectory {
    node_id: Arc<str>,
    steps_applied: Arc<AtomicU32>,
    task: async_rt::JoinHandle<TrajectoryRun>,
}

struct TrajectoryRun {
    outcome: TrajectoryOutcome,
    finished_at: Duration,
}

impl MobilityScheduler {
    pub fn new(tracer: Arc<MobilityTracer>) -> Self {
        let (stop_token, stop_signal) = CancellationToken::new();
        Self {
            tracer,
            active_nodes: Default::default(),
            scheduled: Vec::new(),
            stop_token,
            stop_signal,
            deadline: None,
        }
    }

    /// Starts moving the node along the trajectory
    ///
    /// Must be called from within a tokio runtime. The time baseline of the trajectory is the
    /// moment of this call.
    pub fn schedule(
        &mut self,
        node: Arc<dyn MobileNode>,
        trajectory: Trajectory,
    ) -> Result<(), MobilityError> {
        let node_id = node.id().clone();
        let intervals = trajectory
            .validate()
            .map_err(|reason| MobilityError::InvalidTrajectory {
                node_id: node_id.clone(),
                reason,
            })?;

        if !self.active_nodes.lock().insert(node_id.clone()) {
            return Err(MobilityError::AlreadyScheduled { node_id });
        }

        let active = ActiveNodeGuard {
            node_id: node_id.clone(),
            active_nodes: self.active_nodes.clone(),
        };

        // Read before taking the baseline, so a slow node cannot shift the step deadlines
        let initial_position = node.position();
        let baseline = Instant::now();
        let window_end = baseline + trajectory.end_offset();
        self.deadline = Some(self.deadline.map_or(window_end, |d| d.max(window_end)));

        self.tracer
            .track_trajectory_scheduled(&node_id, initial_position, baseline, &trajectory);

        let steps_applied = Arc::new(AtomicU32::new(0));
        let task = TrajectoryTask {
            node,
            trajectory,
            intervals,
            baseline,
            tracer: self.tracer.clone(),
            stop_token: self.stop_token.clone(),
            steps_applied: steps_applied.clone(),
            _active: active,
        };

        self.scheduled.push(ScheduledTrajectory {
            node_id,
            steps_applied,
            task: async_rt::spawn(task.run()),
        });

        Ok(())
    }

    /// Like [`MobilityScheduler::schedule`], resolving the node through the network first
    pub fn schedule_by_id(
        &mut self,
        network: &WirelessNetwork,
        node_id: &str,
        trajectory: Trajectory,
    ) -> Result<(), MobilityError> {
        let node = network
            .node(node_id)
            .ok_or_else(|| MobilityError::UnknownNode {
                node_id: node_id.into(),
            })?;

        self.schedule(node, trajectory)
    }

    pub fn is_active(&self, node_id: &str) -> bool {
        self.active_nodes.lock().contains(node_id)
    }

    /// The instant by which every trajectory scheduled so far will have finished
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns a handle that stops all trajectories when cancelled, usable from other tasks
    pub fn stop_signal(&self) -> CancellationSignal {
        self.stop_signal.clone()
    }

    /// Stops all trajectories at their next step boundary
    pub fn stop(&self) {
        self.stop_signal.cancel();
    }

    /// Waits for all scheduled trajectories to finish
    pub async fn join(self) -> MobilityReport {
        let mut trajectories = Vec::with_capacity(self.scheduled.len());
        for scheduled in self.scheduled {
            let run = match scheduled.task.await {
                Ok(run) => run,
                Err(e) => {
                    tracing::error!(node = %scheduled.node_id, "trajectory task crashed: {e}");
                    let outcome = TrajectoryOutcome::Failed(TrajectoryFailure::Crashed {
                        node_id: scheduled.node_id.clone(),
                    });
                    self.tracer.track_trajectory_finished(
                        &scheduled.node_id,
                        scheduled.steps_applied.load(atomic::Ordering::SeqCst),
                        &outcome,
                    );

                    TrajectoryRun {
                        outcome,
                        finished_at: self.tracer.elapsed(),
                    }
                }
            };

            trajectories.push(TrajectoryReport {
                node_id: scheduled.node_id,
                steps_applied: scheduled.steps_applied.load(atomic::Ordering::SeqCst),
                outcome: run.outcome,
                finished_at: run.finished_at,
            });
        }

        MobilityReport { trajectories }
    }
}

/// Releases the node for new trajectories once its task ends, also when the task panics
struct ActiveNodeGuard {
    node_id: Arc<str>,
    active_nodes: Arc<Mutex<HashSet<Arc<str>>>>,
}

impl Drop for ActiveNodeGuard {
    fn drop(&mut self) {
        self.active_nodes.lock().remove(&self.node_id);
    }
}

struct TrajectoryTask {
    node: Arc<dyn MobileNode>,
    trajectory: Trajectory,
    intervals: u32,
    baseline: Instant,
    tracer: Arc<MobilityTracer>,
    stop_token: CancellationToken,
    steps_applied: Arc<AtomicU32>,
    _active: ActiveNodeGuard,
}

impl TrajectoryTask {
    async fn run(self) -> TrajectoryRun {
        let outcome = self.follow().await;
        let steps_applied = self.steps_applied.load(atomic::Ordering::SeqCst);
        self.tracer
            .track_trajectory_finished(self.node.id(), steps_applied, &outcome);

        TrajectoryRun {
            outcome,
            finished_at: self.tracer.elapsed(),
        }
    }

    async fn follow(&self) -> TrajectoryOutcome {
        let node_id = self.node.id();
        for step in 0..self.trajectory.applied_steps(self.intervals) {
            let due = self.baseline + self.trajectory.step_offset(step);
            let sleep = async_rt::time::sleep_until(due);
            if self.stop_token.run_until_cancelled(sleep).await.is_none() {
                return TrajectoryOutcome::Stopped;
            }

            let position = self.trajectory.position_at_step(step, self.intervals);
            if let Err(failure) = self.apply(step, position) {
                return TrajectoryOutcome::Failed(failure);
            }

            self.steps_applied.fetch_add(1, atomic::Ordering::SeqCst);
            self.tracer.track_position_updated(node_id, step, position);
        }

        // A stop request arriving now has nothing left to interrupt
        let window_end = self.baseline + self.trajectory.end_offset();
        self.stop_token
            .run_until_cancelled(async_rt::time::sleep_until(window_end))
            .await;

        TrajectoryOutcome::Completed
    }

    fn apply(&self, step: u32, position: Position) -> Result<(), TrajectoryFailure> {
        let node_id = self.node.id();
        let reason = match self.node.set_position(position) {
            Ok(()) => return Ok(()),
            Err(SetPositionError::NodeMissing) => {
                return Err(TrajectoryFailure::NodeMissing {
                    node_id: node_id.clone(),
                    step,
                });
            }
            Err(SetPositionError::Transient(reason)) => reason,
        };

        tracing::warn!(node = %node_id, step, "failed to move node, retrying: {reason}");
        self.node
            .set_position(position)
            .map_err(|e| match e {
                SetPositionError::NodeMissing => TrajectoryFailure::NodeMissing {
                    node_id: node_id.clone(),
                    step,
                },
                SetPositionError::Transient(reason) => TrajectoryFailure::SetPositionFailed {
                    node_id: node_id.clone(),
                    step,
                    reason,
                },
            })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mobility::error::InvalidTrajectory;
    use crate::mobility::trajectory::Arrival;
    use crate::network::spec::{NetworkNodeSpec, NetworkSpec, NodeKind};
    use crate::trace::mobility_step::MobilityStepKind;
    use async_rt::time::sleep;

    /// A node that records every position it is moved to, together with the time of the move
    struct RecordingNode {
        id: Arc<str>,
        start: Instant,
        position: Mutex<Position>,
        moves: Mutex<Vec<(Duration, Position)>>,
        failing_calls: HashSet<u32>,
        calls: AtomicU32,
        panic_on_move: bool,
        position_delay: Duration,
    }

    impl RecordingNode {
        fn new(id: &str, position: Position) -> Self {
            Self {
                id: id.into(),
                start: Instant::now(),
                position: Mutex::new(position),
                moves: Mutex::new(Vec::new()),
                failing_calls: HashSet::new(),
                calls: AtomicU32::new(0),
                panic_on_move: false,
                position_delay: Duration::ZERO,
            }
        }

        /// The n-th call to `set_position` (0-based) fails with a transient error
        fn failing_on(mut self, calls: &[u32]) -> Self {
            self.failing_calls = calls.iter().copied().collect();
            self
        }

        fn panicking(mut self) -> Self {
            self.panic_on_move = true;
            self
        }

        /// Reading the position blocks the thread, like a driver round trip would
        fn slow_position(mut self, delay: Duration) -> Self {
            self.position_delay = delay;
            self
        }

        fn moves(&self) -> Vec<(Duration, Position)> {
            self.moves.lock().clone()
        }

        fn xs(&self) -> Vec<f64> {
            self.moves().into_iter().map(|(_, p)| p.x).collect()
        }
    }

    impl MobileNode for RecordingNode {
        fn id(&self) -> &Arc<str> {
            &self.id
        }

        fn position(&self) -> Position {
            if !self.position_delay.is_zero() {
                std::thread::sleep(self.position_delay);
            }

            *self.position.lock()
        }

        fn set_position(&self, position: Position) -> Result<(), SetPositionError> {
            if self.panic_on_move {
                panic!("radio driver exploded");
            }

            let call = self.calls.fetch_add(1, atomic::Ordering::SeqCst);
            if self.failing_calls.contains(&call) {
                return Err(SetPositionError::Transient("interface busy".to_string()));
            }

            *self.position.lock() = position;
            self.moves.lock().push((self.start.elapsed(), position));
            Ok(())
        }
    }

    fn secs(secs: u64) -> Duration {
        Duration::from_secs(secs)
    }

    fn sta1_trajectory() -> Trajectory {
        Trajectory::linear(
            Position::new(5.0, 10.0, 0.0),
            Position::new(45.0, 10.0, 0.0),
            secs(10),
            secs(10),
        )
    }

    fn sta1() -> Arc<RecordingNode> {
        Arc::new(RecordingNode::new("sta1", Position::new(5.0, 10.0, 0.0)))
    }

    fn new_scheduler() -> MobilityScheduler {
        MobilityScheduler::new(Arc::new(MobilityTracer::new()))
    }

    #[tokio::test(start_paused = true)]
    async fn test_steps_follow_absolute_deadlines() {
        let node = sta1();
        let mut scheduler = new_scheduler();
        scheduler.schedule(node.clone(), sta1_trajectory()).unwrap();

        let report = scheduler.join().await;
        assert!(report.all_completed());
        assert_eq!(report.trajectories[0].steps_applied, 11);
        assert_eq!(report.trajectories[0].finished_at, secs(20));

        let moves = node.moves();
        let times: Vec<_> = moves.iter().map(|(t, _)| t.as_secs()).collect();
        assert_eq!(times, (10..=20).collect::<Vec<_>>());
        assert_eq!(
            node.xs(),
            [5.0, 9.0, 13.0, 17.0, 21.0, 25.0, 29.0, 33.0, 37.0, 41.0, 45.0]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_short_never_reaches_destination() {
        let node = sta1();
        let mut scheduler = new_scheduler();
        scheduler
            .schedule(
                node.clone(),
                sta1_trajectory().with_arrival(Arrival::StopShort),
            )
            .unwrap();

        let report = scheduler.join().await;
        assert!(report.all_completed());
        assert_eq!(report.trajectories[0].steps_applied, 10);

        // Completion is still reported at the end of the window
        assert_eq!(report.trajectories[0].finished_at, secs(20));
        assert_eq!(node.moves().last().unwrap().0, secs(19));
        assert_eq!(
            node.xs(),
            [5.0, 9.0, 13.0, 17.0, 21.0, 25.0, 29.0, 33.0, 37.0, 41.0]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_trajectories_are_independent() {
        let sta1 = sta1();
        let sta2 = Arc::new(RecordingNode::new("sta2", Position::new(15.0, 25.0, 0.0)));
        let sta2_trajectory = Trajectory::linear(
            Position::new(15.0, 25.0, 0.0),
            Position::new(35.0, 15.0, 0.0),
            secs(3),
            secs(4),
        )
        .with_step_interval(Duration::from_millis(500));

        // Scheduled alone
        let mut scheduler = new_scheduler();
        scheduler
            .schedule(sta2.clone(), sta2_trajectory.clone())
            .unwrap();
        scheduler.join().await;
        let alone = sta2.moves();

        // Scheduled next to another trajectory
        let sta2 = Arc::new(RecordingNode::new("sta2", Position::new(15.0, 25.0, 0.0)));
        let mut scheduler = new_scheduler();
        scheduler.schedule(sta1.clone(), sta1_trajectory()).unwrap();
        scheduler.schedule(sta2.clone(), sta2_trajectory).unwrap();
        let report = scheduler.join().await;

        assert!(report.all_completed());
        assert_eq!(sta2.moves(), alone);
        assert_eq!(sta2.moves().len(), 9);
        assert_eq!(sta1.moves().len(), 11);
    }

    #[tokio::test(start_paused = true)]
    async fn test_join_returns_at_latest_window_end() {
        let start = Instant::now();
        let tracer = Arc::new(MobilityTracer::new());
        let mut scheduler = MobilityScheduler::new(tracer.clone());

        let nodes = [
            ("sta1", (5.0, 10.0), (45.0, 10.0), 10, 10),
            ("sta2", (15.0, 25.0), (35.0, 15.0), 30, 30),
            ("sta3", (35.0, 5.0), (15.0, 20.0), 25, 35),
        ];
        let mut recorders = Vec::new();
        for (id, from, to, delay, duration) in nodes {
            let from = Position::new(from.0, from.1, 0.0);
            let to = Position::new(to.0, to.1, 0.0);
            let node = Arc::new(RecordingNode::new(id, from));
            let trajectory = Trajectory::linear(from, to, secs(delay), secs(duration));
            scheduler.schedule(node.clone(), trajectory).unwrap();
            recorders.push(node);
        }

        assert_eq!(scheduler.deadline(), Some(start + secs(60)));
        let report = scheduler.join().await;

        assert_eq!(start.elapsed(), secs(60));
        assert!(report.all_completed());
        for trajectory in &report.trajectories {
            assert!(trajectory.finished_at <= secs(60));
        }
        for node in &recorders {
            assert!(node.moves().iter().all(|(t, _)| *t <= secs(60)));
        }

        // Nothing moves after the join
        sleep(secs(30)).await;
        let total_moves: usize = recorders.iter().map(|n| n.moves().len()).sum();
        assert_eq!(total_moves, 11 + 31 + 36);

        tracer.verifier(Duration::ZERO).verify().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_scheduled_node_is_rejected() {
        let node = sta1();
        let mut scheduler = new_scheduler();
        scheduler.schedule(node.clone(), sta1_trajectory()).unwrap();
        assert!(scheduler.is_active("sta1"));

        let error = scheduler
            .schedule(node.clone(), sta1_trajectory())
            .err()
            .unwrap();
        assert!(matches!(error, MobilityError::AlreadyScheduled { .. }));

        // Once the trajectory is over, the node can move again
        sleep(secs(21)).await;
        assert!(!scheduler.is_active("sta1"));
        scheduler.schedule(node.clone(), sta1_trajectory()).unwrap();

        let report = scheduler.join().await;
        assert_eq!(report.trajectories.len(), 2);
        assert!(report.all_completed());
        assert_eq!(node.moves().len(), 22);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_duration_is_rejected() {
        let node = sta1();
        let mut scheduler = new_scheduler();
        let trajectory = Trajectory {
            duration: Duration::ZERO,
            ..sta1_trajectory()
        };

        let error = scheduler.schedule(node.clone(), trajectory).err().unwrap();
        assert!(matches!(
            error,
            MobilityError::InvalidTrajectory {
                reason: InvalidTrajectory::ZeroDuration,
                ..
            }
        ));
        assert!(!scheduler.is_active("sta1"));
        assert!(scheduler.deadline().is_none());
        assert!(scheduler.join().await.trajectories.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_schedule_by_id_resolves_nodes() {
        let network = WirelessNetwork::initialize(NetworkSpec {
            nodes: vec![NetworkNodeSpec {
                id: "sta1".to_string(),
                kind: NodeKind::Station,
                position: Position::new(5.0, 10.0, 0.0),
                address: None,
                mac: None,
                range: None,
                antenna_gain: None,
                wifi: None,
            }],
            links: Vec::new(),
            propagation: None,
            area: None,
        })
        .unwrap();

        let mut scheduler = new_scheduler();
        let error = scheduler
            .schedule_by_id(&network, "sta9", sta1_trajectory())
            .err()
            .unwrap();
        assert!(matches!(error, MobilityError::UnknownNode { .. }));

        scheduler
            .schedule_by_id(&network, "sta1", sta1_trajectory())
            .unwrap();
        scheduler.join().await;

        let positions = network.positions();
        assert_eq!(positions[0].1, Position::new(45.0, 10.0, 0.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_interrupts_at_step_boundary() {
        let start = Instant::now();
        let node = sta1();
        let mut scheduler = new_scheduler();
        scheduler.schedule(node.clone(), sta1_trajectory()).unwrap();

        let signal = scheduler.stop_signal();
        tokio::spawn(async move {
            sleep(Duration::from_millis(13_500)).await;
            signal.cancel();
        });

        let report = scheduler.join().await;
        assert_eq!(start.elapsed(), Duration::from_millis(13_500));
        assert_eq!(report.trajectories[0].outcome, TrajectoryOutcome::Stopped);
        assert_eq!(report.trajectories[0].steps_applied, 4);
        assert_eq!(node.xs(), [5.0, 9.0, 13.0, 17.0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_before_start_delay_applies_nothing() {
        let start = Instant::now();
        let node = sta1();
        let mut scheduler = new_scheduler();
        scheduler.schedule(node.clone(), sta1_trajectory()).unwrap();

        sleep(secs(4)).await;
        scheduler.stop();

        let report = scheduler.join().await;
        assert_eq!(start.elapsed(), secs(4));
        assert_eq!(report.trajectories[0].outcome, TrajectoryOutcome::Stopped);
        assert_eq!(report.trajectories[0].steps_applied, 0);
        assert_eq!(report.trajectories[0].finished_at, secs(4));
        assert!(node.moves().is_empty());
    }

    #[tokio::test]
    async fn test_real_clock_trace_verifies_with_slow_node() {
        let tracer = Arc::new(MobilityTracer::new());
        let mut scheduler = MobilityScheduler::new(tracer.clone());
        let node = Arc::new(
            RecordingNode::new("sta1", Position::new(5.0, 10.0, 0.0))
                .slow_position(Duration::from_millis(20)),
        );
        let trajectory = Trajectory::linear(
            Position::new(5.0, 10.0, 0.0),
            Position::new(45.0, 10.0, 0.0),
            Duration::from_millis(200),
            Duration::from_millis(400),
        )
        .with_step_interval(Duration::from_millis(200));
        scheduler.schedule(node.clone(), trajectory).unwrap();

        let report = scheduler.join().await;
        assert!(report.all_completed());
        assert_eq!(node.xs(), [5.0, 25.0, 45.0]);

        // Step deadlines are relative to the moment the trajectory was scheduled, so time spent
        // reading the initial position must not make on-time steps look early
        let verified = tracer.verifier(Duration::from_millis(50)).verify().unwrap();
        assert_eq!(verified.stats_by_node["sta1"].steps_applied, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_node_fails_only_its_trajectory() {
        let network = WirelessNetwork::initialize(NetworkSpec {
            nodes: ["sta1", "sta2"]
                .into_iter()
                .map(|id| NetworkNodeSpec {
                    id: id.to_string(),
                    kind: NodeKind::Station,
                    position: Position::new(5.0, 10.0, 0.0),
                    address: None,
                    mac: None,
                    range: None,
                    antenna_gain: None,
                    wifi: None,
                })
                .collect(),
            links: Vec::new(),
            propagation: None,
            area: None,
        })
        .unwrap();

        let mut scheduler = new_scheduler();
        scheduler
            .schedule_by_id(&network, "sta1", sta1_trajectory())
            .unwrap();
        scheduler
            .schedule_by_id(&network, "sta2", sta1_trajectory())
            .unwrap();

        sleep(Duration::from_millis(12_500)).await;
        network.remove_node("sta1");

        let report = scheduler.join().await;
        let sta1 = &report.trajectories[0];
        let sta2 = &report.trajectories[1];

        assert_eq!(
            sta1.outcome,
            TrajectoryOutcome::Failed(TrajectoryFailure::NodeMissing {
                node_id: "sta1".into(),
                step: 3
            })
        );
        assert_eq!(sta1.steps_applied, 3);
        assert_eq!(sta1.finished_at, secs(13));

        assert_eq!(sta2.outcome, TrajectoryOutcome::Completed);
        assert_eq!(sta2.steps_applied, 11);
        assert_eq!(report.failures().count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failure_is_retried_once() {
        let flaky = Arc::new(
            RecordingNode::new("sta1", Position::new(5.0, 10.0, 0.0)).failing_on(&[2]),
        );
        let mut scheduler = new_scheduler();
        scheduler
            .schedule(flaky.clone(), sta1_trajectory())
            .unwrap();

        let report = scheduler.join().await;
        assert!(report.all_completed());
        assert_eq!(flaky.moves().len(), 11);
        assert_eq!(flaky.moves()[2], (secs(12), Position::new(13.0, 10.0, 0.0)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_transient_failure_aborts_trajectory() {
        let flaky = Arc::new(
            RecordingNode::new("sta1", Position::new(5.0, 10.0, 0.0)).failing_on(&[2, 3]),
        );
        let mut scheduler = new_scheduler();
        scheduler
            .schedule(flaky.clone(), sta1_trajectory())
            .unwrap();

        let report = scheduler.join().await;
        assert_eq!(
            report.trajectories[0].outcome,
            TrajectoryOutcome::Failed(TrajectoryFailure::SetPositionFailed {
                node_id: "sta1".into(),
                step: 2,
                reason: "interface busy".to_string(),
            })
        );
        assert_eq!(report.trajectories[0].steps_applied, 2);
        assert_eq!(flaky.xs(), [5.0, 9.0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_node_is_reported_as_crashed() {
        let tracer = Arc::new(MobilityTracer::new());
        let mut scheduler = MobilityScheduler::new(tracer.clone());
        let broken = Arc::new(
            RecordingNode::new("sta1", Position::new(5.0, 10.0, 0.0)).panicking(),
        );
        let healthy = Arc::new(RecordingNode::new("sta2", Position::new(5.0, 10.0, 0.0)));
        scheduler.schedule(broken, sta1_trajectory()).unwrap();
        scheduler
            .schedule(healthy.clone(), sta1_trajectory())
            .unwrap();

        let report = scheduler.join().await;
        assert_eq!(
            report.trajectories[0].outcome,
            TrajectoryOutcome::Failed(TrajectoryFailure::Crashed {
                node_id: "sta1".into()
            })
        );
        assert_eq!(report.trajectories[1].outcome, TrajectoryOutcome::Completed);
        assert_eq!(healthy.moves().len(), 11);

        let finished = tracer
            .stepper()
            .steps()
            .iter()
            .filter(|s| matches!(s.kind, MobilityStepKind::TrajectoryFinished(_)))
            .count();
        assert_eq!(finished, 2);
    }
}
