//! data_runtime: configuration schemas and loaders for the character, camera,
//! simulation clock and telemetry, plus the static world layout.
//!
//! Every config file is optional; missing files fall back to defaults and a
//! handful of env vars override single fields for quick tuning.

use anyhow::Result;
use std::path::Path;

pub mod loader;
pub mod world;
pub mod configs {
    pub mod camera;
    pub mod character;
    pub mod sim;
    pub mod telemetry;
}

use configs::{camera::CameraCfg, character::CharacterCfg, sim::SimCfg, telemetry::TelemetryCfg};

/// All runtime configs loaded together.
#[derive(Debug, Clone, Default)]
pub struct ConfigSet {
    pub character: CharacterCfg,
    pub camera: CameraCfg,
    pub sim: SimCfg,
    pub telemetry: TelemetryCfg,
}

impl ConfigSet {
    /// Load and validate every config under `root` (a `data/` directory).
    pub fn load_from(root: &Path) -> Result<Self> {
        let set = Self {
            character: configs::character::load_from(root)?,
            camera: configs::camera::load_from(root)?,
            sim: configs::sim::load_from(root)?,
            telemetry: configs::telemetry::load_from(root)?,
        };
        set.validate()?;
        Ok(set)
    }

    /// Same as `load_from` with the workspace data root.
    pub fn load_default() -> Result<Self> {
        Self::load_from(&loader::data_root())
    }

    pub fn validate(&self) -> Result<()> {
        self.character.validate()?;
        self.camera.validate()?;
        self.sim.validate()?;
        Ok(())
    }
}
