use crate::config::mobility::MobilitySpecJson;
use crate::config::network::NetworkSpecJson;
use anyhow::Context;
use serde::de::DeserializeOwned;
use std::path::Path;

pub mod cli;
pub mod mobility;
pub mod network;

pub struct MobilityConfig {
    pub network_graph: NetworkSpecJson,
    pub mobility: MobilitySpecJson,
}

pub fn load_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read `{}`", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("invalid JSON in `{}`", path.display()))
}
