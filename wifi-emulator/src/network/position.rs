use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

/// A point in the emulated area, in metres
///
/// `x` and `y` are planar coordinates, `z` is the elevation (e.g. antenna height)
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Linearly interpolates each axis independently, `step` out of `total_steps` of the way
    /// towards `end`
    pub fn interpolate(self, end: Position, step: u32, total_steps: u32) -> Position {
        let axis = |start: f64, end: f64| start + (end - start) * step as f64 / total_steps as f64;
        Position {
            x: axis(self.x, end.x),
            y: axis(self.y, end.y),
            z: axis(self.z, end.z),
        }
    }

    pub fn distance_to(&self, other: &Position) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let dz = other.z - self.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PositionParseError {
    #[error("expected 2 or 3 comma-separated coordinates, found {0}")]
    WrongArity(usize),
    #[error("invalid coordinate `{0}`")]
    InvalidCoordinate(String),
}

impl FromStr for Position {
    type Err = PositionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let coordinates = s
            .split(',')
            .map(|c| {
                let c = c.trim();
                c.parse::<f64>()
                    .map_err(|_| PositionParseError::InvalidCoordinate(c.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        match coordinates[..] {
            [x, y] => Ok(Position::new(x, y, 0.0)),
            [x, y, z] => Ok(Position::new(x, y, z)),
            _ => Err(PositionParseError::WrongArity(coordinates.len())),
        }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match f.precision() {
            Some(p) => write!(f, "{:.*},{:.*},{:.*}", p, self.x, p, self.y, p, self.z),
            None => write!(f, "{},{},{}", self.x, self.y, self.z),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_with_and_without_elevation() {
        assert_eq!(
            "60,10,1".parse::<Position>().unwrap(),
            Position::new(60.0, 10.0, 1.0)
        );
        assert_eq!(
            " 5.5, 10 ".parse::<Position>().unwrap(),
            Position::new(5.5, 10.0, 0.0)
        );
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        assert_eq!(
            "1,2,3,4".parse::<Position>(),
            Err(PositionParseError::WrongArity(4))
        );
        assert_eq!(
            "1,north".parse::<Position>(),
            Err(PositionParseError::InvalidCoordinate("north".to_string()))
        );
    }

    #[test]
    fn test_display_honors_precision() {
        let position = Position::new(15.0, 24.666666666666668, 0.0);
        assert_eq!(format!("{position:.2}"), "15.00,24.67,0.00");
        assert_eq!(position.to_string(), "15,24.666666666666668,0");
    }

    #[test]
    fn test_interpolate_per_axis() {
        let start = Position::new(35.0, 5.0, 0.0);
        let end = Position::new(15.0, 20.0, 0.0);

        assert_eq!(start.interpolate(end, 0, 35), start);
        let halfway = start.interpolate(end, 7, 14);
        assert_eq!(halfway, Position::new(25.0, 12.5, 0.0));
    }

    #[test]
    fn test_distance() {
        let a = Position::new(0.0, 0.0, 0.0);
        let b = Position::new(3.0, 4.0, 0.0);
        assert_eq!(a.distance_to(&b), 5.0);
    }
}
