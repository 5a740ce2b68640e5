use crate::network::position::Position;
use crate::network::spec::{NetworkNodeSpec, NodeKind, WifiSpec};
use anyhow::bail;
use parking_lot::Mutex;
use std::net::IpAddr;
use std::sync::Arc;
use std::sync::atomic::{self, AtomicBool};
use thiserror::Error;

/// Something whose position can be driven by the mobility scheduler
pub trait MobileNode: Send + Sync {
    fn id(&self) -> &Arc<str>;
    fn position(&self) -> Position;
    fn set_position(&self, position: Position) -> Result<(), SetPositionError>;
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SetPositionError {
    /// The node is no longer part of the network, so retrying is pointless
    #[error("node is no longer part of the network")]
    NodeMissing,
    #[error("{0}")]
    Transient(String),
}

pub struct Node {
    pub(crate) id: Arc<str>,
    pub(crate) kind: NodeKind,
    pub(crate) address: Option<IpAddr>,
    pub(crate) mac: Option<String>,
    pub(crate) range: Option<f64>,
    pub(crate) antenna_gain: Option<f64>,
    pub(crate) wifi: Option<WifiSpec>,
    position: Mutex<Position>,
    attached: AtomicBool,
}

impl Node {
    pub(crate) fn new(spec: NetworkNodeSpec) -> anyhow::Result<Self> {
        if spec.id.is_empty() {
            bail!("found node with an empty id");
        }
        if !spec.position.is_finite() {
            bail!("node {} has a non-finite position", spec.id);
        }
        if spec.range.is_some_and(|r| !r.is_finite() || r < 0.0) {
            bail!("node {} has an invalid range", spec.id);
        }
        if spec.kind == NodeKind::Station && spec.wifi.is_some() {
            bail!(
                "node {} is a station, but wifi settings are only supported for access points",
                spec.id
            );
        }

        Ok(Self {
            id: spec.id.into(),
            kind: spec.kind,
            address: spec.address,
            mac: spec.mac,
            range: spec.range,
            antenna_gain: spec.antenna_gain,
            wifi: spec.wifi,
            position: Mutex::new(spec.position),
            attached: AtomicBool::new(true),
        })
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn address(&self) -> Option<IpAddr> {
        self.address
    }

    pub fn mac(&self) -> Option<&str> {
        self.mac.as_deref()
    }

    pub fn range(&self) -> Option<f64> {
        self.range
    }

    pub fn antenna_gain(&self) -> Option<f64> {
        self.antenna_gain
    }

    pub fn wifi(&self) -> Option<&WifiSpec> {
        self.wifi.as_ref()
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(atomic::Ordering::SeqCst)
    }

    pub(crate) fn detach(&self) {
        let _position = self.position.lock();
        self.attached.store(false, atomic::Ordering::SeqCst);
    }
}

impl MobileNode for Node {
    fn id(&self) -> &Arc<str> {
        &self.id
    }

    fn position(&self) -> Position {
        *self.position.lock()
    }

    fn set_position(&self, position: Position) -> Result<(), SetPositionError> {
        // Checked under the lock, which `detach` also takes
        let mut current = self.position.lock();
        if !self.is_attached() {
            return Err(SetPositionError::NodeMissing);
        }

        *current = position;
        Ok(())
    }
}
