use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};
use std::time::Duration;
use wifi_emulator::mobility::trajectory::{Arrival, DEFAULT_STEP_INTERVAL, Trajectory};
use wifi_emulator::network::position::Position;

#[derive(Deserialize, Clone)]
pub struct MobilitySpecJson {
    pub trajectories: Vec<TrajectoryJson>,
}

#[serde_as]
#[derive(Deserialize, Clone)]
pub struct TrajectoryJson {
    /// Id of the node that will follow the trajectory
    pub node: String,
    /// Time to wait before the motion starts, in milliseconds
    pub start_delay_ms: u64,
    /// Duration of the motion, in milliseconds
    pub duration_ms: u64,
    /// Time between position updates, in milliseconds (defaults to one second)
    pub step_interval_ms: Option<u64>,
    /// Start point, as `"x,y,z"` (defaults to the node's position when the trajectory is scheduled)
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub from: Option<Position>,
    /// End point, as `"x,y,z"`
    #[serde_as(as = "DisplayFromStr")]
    pub to: Position,
    #[serde(default)]
    pub arrival: ArrivalJson,
}

#[derive(Deserialize, Clone, Copy, Default)]
#[serde(rename_all = "camelCase")]
pub enum ArrivalJson {
    #[default]
    Exact,
    StopShort,
}

impl TrajectoryJson {
    pub fn to_trajectory(&self, node_position: Position) -> Trajectory {
        let step_interval = self
            .step_interval_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_STEP_INTERVAL);
        let arrival = match self.arrival {
            ArrivalJson::Exact => Arrival::Exact,
            ArrivalJson::StopShort => Arrival::StopShort,
        };

        Trajectory::linear(
            self.from.unwrap_or(node_position),
            self.to,
            Duration::from_millis(self.start_delay_ms),
            Duration::from_millis(self.duration_ms),
        )
        .with_step_interval(step_interval)
        .with_arrival(arrival)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_trajectories() {
        let json = r#"{
            "trajectories": [
                {
                    "node": "sta1",
                    "start_delay_ms": 10000,
                    "duration_ms": 10000,
                    "from": "5,10,0",
                    "to": "45,10,0",
                    "arrival": "stopShort"
                },
                {
                    "node": "sta2",
                    "start_delay_ms": 0,
                    "duration_ms": 2000,
                    "step_interval_ms": 500,
                    "to": "35,15"
                }
            ]
        }"#;

        let spec: MobilitySpecJson = serde_json::from_str(json).unwrap();
        let origin = Position::new(1.0, 2.0, 3.0);

        let sta1 = spec.trajectories[0].to_trajectory(origin);
        assert_eq!(sta1.start, Position::new(5.0, 10.0, 0.0));
        assert_eq!(sta1.start_delay, Duration::from_secs(10));
        assert_eq!(sta1.step_interval, DEFAULT_STEP_INTERVAL);
        assert_eq!(sta1.arrival, Arrival::StopShort);

        let sta2 = spec.trajectories[1].to_trajectory(origin);
        assert_eq!(sta2.start, origin);
        assert_eq!(sta2.end, Position::new(35.0, 15.0, 0.0));
        assert_eq!(sta2.step_interval, Duration::from_millis(500));
        assert_eq!(sta2.arrival, Arrival::Exact);
    }
}
