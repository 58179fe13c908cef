//! Simulation clock and record/export settings from data/config/sim.toml.

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::loader::{env_parse, read_toml_or_default};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimCfg {
    pub tick_hz: u32,
    /// Upper bound on ticks run in one frame; the rest of the backlog is dropped.
    pub max_ticks_per_frame: u32,
    /// Frame deltas are clamped to this many seconds before accumulating.
    pub max_frame_delta: f32,
    /// Write a telemetry CSV while a recorded session plays back.
    pub export_csv: bool,
    /// Directory (relative to the data dir) for sessions and CSVs.
    pub records_dir: String,
}

impl Default for SimCfg {
    fn default() -> Self {
        Self {
            tick_hz: 50,
            max_ticks_per_frame: 8,
            max_frame_delta: 0.25,
            export_csv: true,
            records_dir: "Records".to_string(),
        }
    }
}

impl SimCfg {
    #[must_use]
    pub fn tick_dt(&self) -> f32 {
        1.0 / self.tick_hz.max(1) as f32
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_hz == 0 {
            bail!("tick_hz must be positive");
        }
        if self.max_ticks_per_frame == 0 {
            bail!("max_ticks_per_frame must be positive");
        }
        if self.max_frame_delta <= 0.0 {
            bail!("max_frame_delta must be positive");
        }
        Ok(())
    }
}

pub fn load_from(root: &Path) -> Result<SimCfg> {
    let mut cfg: SimCfg = read_toml_or_default(root, "sim")?;
    if let Some(v) = env_parse("TICK_HZ") {
        cfg.tick_hz = v;
    }
    if let Some(v) = env_parse("EXPORT_CSV") {
        cfg.export_csv = v;
    }
    Ok(cfg)
}
