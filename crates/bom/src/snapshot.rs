//! Snapshot file: the events and catalog captured at one logical instant.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use solarops_bookings::{Material, MovementEvent};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub events: Vec<MovementEvent>,
    #[serde(default)]
    pub materials: Vec<Material>,
}

impl Snapshot {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read snapshot {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("invalid snapshot {}", path.display()))
    }

    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}
