//! Emulated wireless network
//!
//! Holds the nodes of a topology together with their positions. Radio behavior is out of scope:
//! links and propagation settings are kept as plain configuration for whatever drives the radio
//! layer.

pub mod node;
pub mod position;
pub mod spec;

use crate::network::node::{MobileNode, Node};
use crate::network::position::Position;
use crate::network::spec::{
    AreaBounds, LinkKind, NetworkLinkSpec, NetworkSpec, NodeKind, PropagationModel,
};
use anyhow::bail;
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

/// Explicit handle to the emulated network, meant to be passed to every component that needs it
pub struct WirelessNetwork {
    nodes: Mutex<HashMap<Arc<str>, Arc<Node>>>,
    links: Vec<NetworkLinkSpec>,
    propagation: Option<PropagationModel>,
    area: Option<AreaBounds>,
}

impl WirelessNetwork {
    pub fn initialize(spec: NetworkSpec) -> anyhow::Result<Arc<Self>> {
        let mut nodes = HashMap::new();
        let mut addresses = HashSet::new();
        for node_spec in spec.nodes {
            let node = Node::new(node_spec)?;

            if let Some(address) = node.address {
                if !addresses.insert(address) {
                    bail!("found duplicate address {address} (node {})", node.id);
                }
            }

            let id = node.id.clone();
            if nodes.insert(id.clone(), Arc::new(node)).is_some() {
                bail!("found duplicate node id: {id}");
            }
        }

        if let Some(area) = spec.area {
            if !(area.max_x > 0.0 && area.max_y > 0.0) {
                bail!(
                    "area bounds must be positive, found {} x {}",
                    area.max_x,
                    area.max_y
                );
            }

            for node in nodes.values() {
                let position = node.position();
                if !area.contains(&position) {
                    bail!(
                        "node {} is placed at {position}, outside of the area",
                        node.id
                    );
                }
            }
        }

        for link in &spec.links {
            for endpoint in [&link.source, &link.target] {
                let Some(node) = nodes.get(endpoint.as_str()) else {
                    bail!(
                        "link {} references node {endpoint}, which does not exist",
                        link.id()
                    );
                };

                if let LinkKind::AdHoc(_) = link.kind {
                    if node.kind != NodeKind::Station {
                        bail!(
                            "ad-hoc link {} references node {endpoint}, which is not a station",
                            link.id()
                        );
                    }
                }
            }

            if link.source == link.target {
                bail!("link {} connects a node to itself", link.id());
            }
        }

        Ok(Arc::new(Self {
            nodes: Mutex::new(nodes),
            links: spec.links,
            propagation: spec.propagation,
            area: spec.area,
        }))
    }

    pub fn node(&self, id: &str) -> Option<Arc<Node>> {
        self.nodes.lock().get(id).cloned()
    }

    /// Returns all nodes, sorted by id
    pub fn nodes(&self) -> Vec<Arc<Node>> {
        let mut nodes: Vec<_> = self.nodes.lock().values().cloned().collect();
        nodes.sort_unstable_by(|n1, n2| n1.id.cmp(&n2.id));
        nodes
    }

    pub fn stations(&self) -> Vec<Arc<Node>> {
        self.nodes_of_kind(NodeKind::Station)
    }

    pub fn access_points(&self) -> Vec<Arc<Node>> {
        self.nodes_of_kind(NodeKind::AccessPoint)
    }

    fn nodes_of_kind(&self, kind: NodeKind) -> Vec<Arc<Node>> {
        self.nodes()
            .into_iter()
            .filter(|n| n.kind == kind)
            .collect()
    }

    pub fn links(&self) -> &[NetworkLinkSpec] {
        &self.links
    }

    pub fn propagation(&self) -> Option<&PropagationModel> {
        self.propagation.as_ref()
    }

    pub fn area(&self) -> Option<AreaBounds> {
        self.area
    }

    /// Ids of the nodes that take part in at least one ad-hoc link, sorted
    pub fn adhoc_nodes(&self) -> Vec<Arc<str>> {
        let ids: BTreeSet<&str> = self
            .links
            .iter()
            .filter(|l| matches!(l.kind, LinkKind::AdHoc(_)))
            .flat_map(|l| [l.source.as_str(), l.target.as_str()])
            .collect();

        ids.into_iter()
            .filter_map(|id| self.node(id).map(|n| n.id.clone()))
            .collect()
    }

    /// Removes the node from the network
    ///
    /// Anyone still holding the node will get [`node::SetPositionError::NodeMissing`] when trying
    /// to move it
    pub fn remove_node(&self, id: &str) -> Option<Arc<Node>> {
        let node = self.nodes.lock().remove(id)?;
        node.detach();
        Some(node)
    }

    /// Returns a snapshot of every node's position, sorted by node id
    pub fn positions(&self) -> Vec<(Arc<str>, Position)> {
        self.nodes()
            .into_iter()
            .map(|n| (n.id.clone(), n.position()))
            .collect()
    }

    /// Whether both nodes are within each other's range, based purely on distance
    ///
    /// Nodes without a configured range are never in range
    pub fn in_range(&self, a: &str, b: &str) -> bool {
        let (Some(a), Some(b)) = (self.node(a), self.node(b)) else {
            return false;
        };
        let (Some(range_a), Some(range_b)) = (a.range, b.range) else {
            return false;
        };

        a.position().distance_to(&b.position()) <= range_a.min(range_b)
    }
}
