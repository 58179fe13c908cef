//! Follow-camera tuning loaded from data/config/camera.toml.

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::loader::{env_parse, read_toml_or_default};

/// Which clock advances yaw/pitch smoothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrbitClock {
    /// Fixed tick; logical yaw depends only on the input stream.
    #[default]
    Tick,
    /// Render frame; smoother at high frame rates, not replay-exact.
    Frame,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraCfg {
    pub preset: String,
    pub rotation_smooth_time: f32,
    pub zoom_smooth_factor: f32,
    /// Degrees per unit of look input.
    pub mouse_sensitivity: f32,
    pub min_vertical_angle: f32,
    pub max_vertical_angle: f32,
    /// Distance per unit of zoom input.
    pub zoom_sensitivity: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Occlusion probe radius.
    pub camera_radius: f32,
    /// Height of the orbit pivot above the character's feet.
    pub target_height: f32,
    pub initial_yaw: f32,
    pub initial_pitch: f32,
    pub initial_zoom: f32,
    pub orbit_clock: OrbitClock,
}

impl Default for CameraCfg {
    fn default() -> Self {
        Self {
            preset: "Default".to_string(),
            rotation_smooth_time: 0.1,
            zoom_smooth_factor: 6.0,
            mouse_sensitivity: 24.0,
            min_vertical_angle: -90.0,
            max_vertical_angle: 90.0,
            zoom_sensitivity: 50.0,
            min_zoom: 1.0,
            max_zoom: 30.0,
            camera_radius: 0.2,
            target_height: 1.6,
            initial_yaw: 0.0,
            initial_pitch: 0.0,
            initial_zoom: 20.0,
            orbit_clock: OrbitClock::Tick,
        }
    }
}

impl CameraCfg {
    pub fn validate(&self) -> Result<()> {
        if self.min_zoom < 0.0 || self.min_zoom > self.max_zoom {
            bail!("zoom range [{}, {}] is inverted", self.min_zoom, self.max_zoom);
        }
        if self.min_vertical_angle > self.max_vertical_angle {
            bail!(
                "pitch range [{}, {}] is inverted",
                self.min_vertical_angle,
                self.max_vertical_angle
            );
        }
        if self.rotation_smooth_time <= 0.0 || self.zoom_smooth_factor <= 0.0 {
            bail!("camera smoothing rates must be positive");
        }
        if self.camera_radius < 0.0 || self.target_height < 0.0 {
            bail!("camera_radius and target_height must be non-negative");
        }
        Ok(())
    }
}

pub fn load_from(root: &Path) -> Result<CameraCfg> {
    let mut cfg: CameraCfg = read_toml_or_default(root, "camera")?;
    if let Some(v) = env_parse("MOUSE_SENS") {
        cfg.mouse_sensitivity = v;
    }
    if let Some(v) = env_parse("MIN_ZOOM") {
        cfg.min_zoom = v;
    }
    if let Some(v) = env_parse("MAX_ZOOM") {
        cfg.max_zoom = v;
    }
    Ok(cfg)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orbit_clock_parses_snake_case() {
        let cfg: CameraCfg = toml::from_str("orbit_clock = \"frame\"").unwrap();
        assert_eq!(cfg.orbit_clock, OrbitClock::Frame);
        assert_eq!(CameraCfg::default().orbit_clock, OrbitClock::Tick);
    }

    #[test]
    fn validate_rejects_inverted_ranges() {
        let zoom = CameraCfg {
            min_zoom: 10.0,
            max_zoom: 5.0,
            ..CameraCfg::default()
        };
        assert!(zoom.validate().is_err());
        let pitch = CameraCfg {
            min_vertical_angle: 30.0,
            max_vertical_angle: -30.0,
            ..CameraCfg::default()
        };
        assert!(pitch.validate().is_err());
    }
}
