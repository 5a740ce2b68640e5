use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};
use std::net::IpAddr;
use wifi_emulator::network::position::Position;
use wifi_emulator::network::spec::{
    AdHocSpec, AreaBounds, LinkKind, NetworkLinkSpec, NetworkNodeSpec, NetworkSpec, NodeKind,
    PropagationModel, WifiSpec,
};

#[derive(Deserialize, Clone)]
pub struct NetworkSpecJson {
    nodes: Vec<NetworkNodeJson>,
    #[serde(default)]
    links: Vec<NetworkLinkJson>,
    propagation: Option<PropagationJson>,
    area: Option<AreaJson>,
}

#[serde_as]
#[derive(Deserialize, Clone)]
struct NetworkNodeJson {
    id: String,
    #[serde(rename = "type")]
    #[serde(default = "default_network_node_kind")]
    kind: NetworkNodeKindJson,
    /// Initial position, as `"x,y,z"`
    #[serde_as(as = "DisplayFromStr")]
    position: Position,
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    address: Option<IpAddr>,
    mac: Option<String>,
    /// Radio range, in metres
    range: Option<f64>,
    antenna_gain: Option<f64>,
    wifi: Option<WifiJson>,
}

fn default_network_node_kind() -> NetworkNodeKindJson {
    NetworkNodeKindJson::Station
}

#[derive(Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
enum NetworkNodeKindJson {
    Station,
    AccessPoint,
}

#[derive(Deserialize, Clone)]
struct WifiJson {
    ssid: String,
    mode: String,
    channel: u16,
}

#[derive(Deserialize, Clone)]
struct NetworkLinkJson {
    source: String,
    target: String,
    #[serde(flatten)]
    kind: NetworkLinkKindJson,
}

#[derive(Deserialize, Clone)]
#[serde(tag = "type", rename_all = "camelCase")]
enum NetworkLinkKindJson {
    Wired,
    Adhoc {
        ssid: String,
        mode: String,
        channel: u16,
        ht_cap: Option<String>,
    },
}

#[derive(Deserialize, Clone)]
struct PropagationJson {
    model: String,
    exp: f64,
    /// Noise threshold of the interference model, in dBm
    noise_th: Option<f64>,
    fading_cof: Option<f64>,
}

#[derive(Deserialize, Clone)]
struct AreaJson {
    max_x: f64,
    max_y: f64,
}

impl From<NetworkSpecJson> for NetworkSpec {
    fn from(json: NetworkSpecJson) -> Self {
        let nodes = json
            .nodes
            .into_iter()
            .map(|n| NetworkNodeSpec {
                id: n.id,
                kind: match n.kind {
                    NetworkNodeKindJson::Station => NodeKind::Station,
                    NetworkNodeKindJson::AccessPoint => NodeKind::AccessPoint,
                },
                position: n.position,
                address: n.address,
                mac: n.mac,
                range: n.range,
                antenna_gain: n.antenna_gain,
                wifi: n.wifi.map(|w| WifiSpec {
                    ssid: w.ssid,
                    mode: w.mode,
                    channel: w.channel,
                }),
            })
            .collect();

        let links = json.links.into_iter().map(|l| l.into()).collect();

        Self {
            nodes,
            links,
            propagation: json.propagation.map(|p| PropagationModel {
                model: p.model,
                exponent: p.exp,
                noise_threshold: p.noise_th,
                fading_coefficient: p.fading_cof,
            }),
            area: json.area.map(|a| AreaBounds {
                max_x: a.max_x,
                max_y: a.max_y,
            }),
        }
    }
}

impl From<NetworkLinkJson> for NetworkLinkSpec {
    fn from(l: NetworkLinkJson) -> Self {
        NetworkLinkSpec {
            source: l.source,
            target: l.target,
            kind: match l.kind {
                NetworkLinkKindJson::Wired => LinkKind::Wired,
                NetworkLinkKindJson::Adhoc {
                    ssid,
                    mode,
                    channel,
                    ht_cap,
                } => LinkKind::AdHoc(AdHocSpec {
                    ssid,
                    mode,
                    channel,
                    ht_cap,
                }),
            },
        }
    }
}
