//! Character locomotion tuning loaded from data/config/character.toml.

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::loader::{env_parse, read_toml_or_default};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterCfg {
    /// Preset name; also used in telemetry file names.
    pub preset: String,
    pub walk_speed: f32,
    pub sprint_speed: f32,
    pub jump_height: f32,
    pub gravity_factor: f32,
    pub position_smooth_factor: f32,
    pub rotation_smooth_factor: f32,
    pub yaw_smooth_time: f32,
    pub capsule_radius: f32,
    pub capsule_height: f32,
}

impl Default for CharacterCfg {
    fn default() -> Self {
        Self {
            preset: "Default".to_string(),
            walk_speed: 5.0,
            sprint_speed: 8.0,
            jump_height: 0.5,
            gravity_factor: 1.0,
            position_smooth_factor: 1.0,
            rotation_smooth_factor: 1.0,
            yaw_smooth_time: 0.1,
            capsule_radius: 0.4,
            capsule_height: 1.8,
        }
    }
}

impl CharacterCfg {
    pub fn validate(&self) -> Result<()> {
        if self.walk_speed < 0.0 || self.sprint_speed < 0.0 {
            bail!("character speeds must be non-negative");
        }
        if self.jump_height < 0.0 || self.gravity_factor < 0.0 {
            bail!("jump_height and gravity_factor must be non-negative");
        }
        if self.yaw_smooth_time <= 0.0 {
            bail!("yaw_smooth_time must be positive");
        }
        if self.capsule_radius <= 0.0 || self.capsule_height < self.capsule_radius * 2.0 {
            bail!(
                "capsule {}x{} is degenerate",
                self.capsule_radius,
                self.capsule_height
            );
        }
        Ok(())
    }
}

pub fn load_from(root: &Path) -> Result<CharacterCfg> {
    let mut cfg: CharacterCfg = read_toml_or_default(root, "character")?;
    // Env overrides for quick tuning (optional)
    if let Some(v) = env_parse("WALK_SPEED") {
        cfg.walk_speed = v;
    }
    if let Some(v) = env_parse("SPRINT_SPEED") {
        cfg.sprint_speed = v;
    }
    Ok(cfg)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let cfg: CharacterCfg = toml::from_str("walk_speed = 3.5\npreset = \"Heavy\"").unwrap();
        assert_eq!(cfg.walk_speed, 3.5);
        assert_eq!(cfg.preset, "Heavy");
        assert_eq!(cfg.sprint_speed, 8.0);
        assert_eq!(cfg.yaw_smooth_time, 0.1);
    }

    #[test]
    fn validate_rejects_degenerate_capsule() {
        let cfg = CharacterCfg {
            capsule_height: 0.5,
            ..CharacterCfg::default()
        };
        assert!(cfg.validate().is_err());
        assert!(CharacterCfg::default().validate().is_ok());
    }
}
