use crate::network::position::Position;
use std::net::IpAddr;

#[derive(Clone, Debug)]
pub struct NetworkSpec {
    pub nodes: Vec<NetworkNodeSpec>,
    pub links: Vec<NetworkLinkSpec>,
    pub propagation: Option<PropagationModel>,
    /// Extent of the emulated area, used when plotting the topology
    pub area: Option<AreaBounds>,
}

#[derive(Clone, Debug)]
pub struct NetworkNodeSpec {
    pub id: String,
    pub kind: NodeKind,
    pub position: Position,
    pub address: Option<IpAddr>,
    pub mac: Option<String>,
    /// Radio range, in metres
    pub range: Option<f64>,
    pub antenna_gain: Option<f64>,
    /// Only meaningful for access points
    pub wifi: Option<WifiSpec>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Station,
    AccessPoint,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WifiSpec {
    pub ssid: String,
    pub mode: String,
    pub channel: u16,
}

#[derive(Clone, Debug)]
pub struct NetworkLinkSpec {
    pub source: String,
    pub target: String,
    pub kind: LinkKind,
}

impl NetworkLinkSpec {
    pub fn id(&self) -> String {
        format!("{}-{}", self.source, self.target)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum LinkKind {
    /// Backhaul between access points
    Wired,
    /// Ad-hoc (IBSS) link between stations
    AdHoc(AdHocSpec),
}

#[derive(Clone, Debug, PartialEq)]
pub struct AdHocSpec {
    pub ssid: String,
    pub mode: String,
    pub channel: u16,
    pub ht_cap: Option<String>,
}

/// Propagation model parameters, handed over untouched to whatever models the radio layer
#[derive(Clone, Debug, PartialEq)]
pub struct PropagationModel {
    pub model: String,
    pub exponent: f64,
    /// Interference noise threshold, in dBm
    pub noise_threshold: Option<f64>,
    pub fading_coefficient: Option<f64>,
}

/// Upper bounds of the emulated area, in metres (the lower bounds are the origin)
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AreaBounds {
    pub max_x: f64,
    pub max_y: f64,
}

impl AreaBounds {
    /// Whether the point lies within the area, ignoring its elevation
    pub fn contains(&self, position: &Position) -> bool {
        (0.0..=self.max_x).contains(&position.x) && (0.0..=self.max_y).contains(&position.y)
    }
}
