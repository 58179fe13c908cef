//! Recorded session: initial state of both integrators plus the ordered
//! stream of `ControlFrame`s, one per tick.

use client_core::input::ControlFrame;
use client_core::snapshot::{CameraSnapshot, PlayerSnapshot};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedSession {
    #[serde(rename = "initialCameraData")]
    pub initial_camera: CameraSnapshot,
    #[serde(rename = "initialPlayerData")]
    pub initial_player: PlayerSnapshot,
    /// Tick order.
    #[serde(rename = "inputDatas", default)]
    pub frames: Vec<ControlFrame>,
}

impl RecordedSession {
    #[must_use]
    pub fn new(initial_camera: CameraSnapshot, initial_player: PlayerSnapshot) -> Self {
        Self {
            initial_camera,
            initial_player,
            frames: Vec::new(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(txt: &str) -> serde_json::Result<Self> {
        serde_json::from_str(txt)
    }
}
