//! Per-tick and per-frame systems driving the follow camera and the
//! simulation mode.

pub mod camera;
pub mod mode;
pub mod occlusion;
