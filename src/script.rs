//! Scripted input: a JSON list of device samples, each held for `repeat`
//! frames of `dt` seconds.
//!
//! ```json
//! { "frameDt": 0.016,
//!   "steps": [ { "repeat": 60, "moveInput": [0, 1] },
//!              { "jump": true },
//!              { "repeat": 30, "dt": 0.033, "lookInput": [0.5, 0] } ] }
//! ```

use anyhow::{Result, bail};
use client_core::input::{DeviceSample, ScriptedDevice};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_frame_dt() -> f32 {
    1.0 / 60.0
}

fn one() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptStep {
    #[serde(default = "one")]
    pub repeat: u32,
    /// Overrides the script's frame delta for these frames.
    #[serde(default)]
    pub dt: Option<f32>,
    #[serde(flatten)]
    pub sample: DeviceSample,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputScript {
    #[serde(default = "default_frame_dt")]
    pub frame_dt: f32,
    #[serde(default)]
    pub steps: Vec<ScriptStep>,
}

impl InputScript {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let script: Self = data_runtime::loader::read_json(path)?;
        script.validate()?;
        Ok(script)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.frame_dt.is_finite() || self.frame_dt <= 0.0 {
            bail!("frameDt must be positive");
        }
        for (i, s) in self.steps.iter().enumerate() {
            if s.dt.is_some_and(|dt| !dt.is_finite() || dt <= 0.0) {
                bail!("step {i}: dt must be positive");
            }
        }
        Ok(())
    }

    /// `(frame_dt, sample)` for every frame, in order.
    #[must_use]
    pub fn frames(&self) -> Vec<(f32, DeviceSample)> {
        self.steps
            .iter()
            .flat_map(|s| {
                let dt = s.dt.unwrap_or(self.frame_dt);
                std::iter::repeat_n((dt, s.sample), s.repeat as usize)
            })
            .collect()
    }

    /// Device for these frames plus the matching frame deltas.
    #[must_use]
    pub fn device(&self) -> (ScriptedDevice, Vec<f32>) {
        let frames = self.frames();
        let dts = frames.iter().map(|(dt, _)| *dt).collect();
        (ScriptedDevice::new(frames.into_iter().map(|(_, s)| s)), dts)
    }
}
