//! Minimal serializable state of the character and the camera. Used as the
//! seed of a recorded session and as a telemetry row payload.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub position: Vec3,
    pub rotation: Quat,
    pub velocity: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraSnapshot {
    pub position: Vec3,
    pub rotation: Quat,
    /// Logical (pre-occlusion) distance.
    pub zoom: f32,
}
